// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use tracing::debug;

use super::types::{Backend, BackendGroup, CertBundleId, TrustedCertificate, VerifyTls, VirtualServer};
use crate::{
    common::ResourceKey,
    graph::{BackendRef, BackendTlsPolicy},
};

/// Default trust store of the data plane image, used when a backend TLS policy names no CA bundle.
pub const ALPINE_SSL_ROOT_CA_PATH: &str = "/etc/ssl/cert.pem";

pub fn new_backend_group(refs: &[BackendRef], source: &ResourceKey, rule_idx: usize, root_ca_path: &str) -> BackendGroup {
    BackendGroup {
        source: source.clone(),
        rule_idx,
        backends: refs
            .iter()
            .map(|backend_ref| Backend {
                upstream_name: backend_ref.service_port_reference(),
                weight: backend_ref.weight,
                valid: backend_ref.valid,
                verify_tls: backend_ref.backend_tls_policy.as_ref().and_then(|policy| convert_backend_tls(policy, root_ca_path)),
            })
            .collect(),
    }
}

pub fn convert_backend_tls(policy: &BackendTlsPolicy, root_ca_path: &str) -> Option<VerifyTls> {
    if !policy.valid {
        return None;
    }
    let trusted_certificate = match policy.ca_cert_ref() {
        Some(ca_cert_ref) => TrustedCertificate::CertBundle(CertBundleId::new(ca_cert_ref)),
        None => TrustedCertificate::RootCaPath(root_ca_path.to_owned()),
    };
    Some(VerifyTls { trusted_certificate, hostname: policy.hostname.clone() })
}

/// One group per route rule used by any server. A route attached to several listeners yields its groups once.
pub fn build_backend_groups<'a>(servers: impl IntoIterator<Item = &'a VirtualServer>) -> Vec<BackendGroup> {
    let unique_groups = servers
        .into_iter()
        .flat_map(|server| &server.path_rules)
        .flat_map(|path_rule| &path_rule.match_rules)
        .map(|match_rule| &match_rule.backend_group)
        .fold(BTreeMap::<(&ResourceKey, usize), &BackendGroup>::new(), |mut acc, group| {
            acc.entry((&group.source, group.rule_idx)).or_insert(group);
            acc
        });

    debug!("Unique backend groups {}", unique_groups.len());
    unique_groups.into_values().cloned().collect()
}

#[cfg(test)]
mod tests {
    use kube_core::ObjectMeta;

    use super::*;
    use crate::dataplane::types::{Match, MatchFilters, MatchRule, PathRule, PathType};

    fn backend_ref(name: &str, weight: i32) -> BackendRef {
        BackendRef::builder().svc_ns_name(ResourceKey::namespaced(name, "test")).service_port(80).weight(weight).build()
    }

    fn server(hostname: &str, groups: &[BackendGroup]) -> VirtualServer {
        VirtualServer {
            hostname: hostname.to_owned(),
            port: 80,
            path_rules: vec![PathRule {
                path: "/".to_owned(),
                path_type: PathType::Prefix,
                grpc: false,
                match_rules: groups
                    .iter()
                    .map(|group| MatchRule {
                        filters: MatchFilters::None,
                        source: ObjectMeta::default(),
                        r#match: Match::default(),
                        backend_group: group.clone(),
                    })
                    .collect(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn zero_weight_backends_are_kept() {
        let refs = [backend_ref("foo", 0), backend_ref("bar", 1)];
        let group = new_backend_group(&refs, &ResourceKey::new("route"), 0, ALPINE_SSL_ROOT_CA_PATH);
        assert_eq!(group.backends.len(), 2);
        assert_eq!(group.backends[0].weight, 0);
        assert_eq!(group.backends[0].upstream_name, "test_foo_80");
        assert!(group.backends.iter().all(|b| b.verify_tls.is_none()));
    }

    #[test]
    fn groups_shared_between_listeners_collapse() {
        let route = ResourceKey::namespaced("route", "test");
        let rule0 = new_backend_group(&[backend_ref("foo", 1)], &route, 0, ALPINE_SSL_ROOT_CA_PATH);
        let rule1 = new_backend_group(&[backend_ref("bar", 1)], &route, 1, ALPINE_SSL_ROOT_CA_PATH);
        let servers = [server("foo.example.com", &[rule0.clone(), rule1.clone()]), server("bar.example.com", &[rule0.clone()])];

        let groups = build_backend_groups(&servers);
        assert_eq!(groups, vec![rule0, rule1]);
        assert_eq!(build_backend_groups(&servers), groups);
    }

    #[test]
    fn no_servers_no_groups() {
        assert!(build_backend_groups(&Vec::<VirtualServer>::new()).is_empty());
    }

    #[test]
    fn backend_tls_conversion() {
        let policy = BackendTlsPolicy::builder().ca_cert_ref(ResourceKey::namespaced("ca", "test")).hostname("foo.example.com").build();
        let verify = convert_backend_tls(&policy, ALPINE_SSL_ROOT_CA_PATH).unwrap();
        assert_eq!(verify.cert_bundle_id().map(CertBundleId::as_str), Some("cert_bundle_test_ca"));
        assert_eq!(verify.hostname, "foo.example.com");

        let policy = BackendTlsPolicy::builder().hostname("foo.example.com").build();
        let verify = convert_backend_tls(&policy, "/custom/ca.pem").unwrap();
        assert_eq!(verify.trusted_certificate, TrustedCertificate::RootCaPath("/custom/ca.pem".to_owned()));

        let policy = BackendTlsPolicy::builder().valid(false).hostname("foo.example.com").build();
        assert!(convert_backend_tls(&policy, ALPINE_SSL_ROOT_CA_PATH).is_none());
    }
}
