// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::{BTreeMap, BTreeSet};

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

use super::types::{BackendGroup, CertBundle, CertBundleId, SslKeyPair, SslKeyPairId};
use crate::graph::{Gateway, Graph, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};

/// Key pairs of the secrets resolved by valid listeners.
pub fn build_ssl_key_pairs(graph: &Graph, gateway: &Gateway) -> BTreeMap<SslKeyPairId, SslKeyPair> {
    gateway
        .listeners
        .iter()
        .filter(|listener| listener.valid)
        .filter_map(|listener| listener.resolved_secret.as_ref())
        .map(|secret_key| {
            let id = SslKeyPairId::new(secret_key);
            let Some(secret) = graph.referenced_secrets.get(secret_key) else {
                warn!("Listener secret {secret_key} is not among the referenced secrets");
                return (id, SslKeyPair { cert: vec![], key: vec![] });
            };
            let field = |key: &str| {
                secret.data(key).map(<[u8]>::to_vec).unwrap_or_else(|| {
                    warn!("Secret {secret_key} has no {key} entry");
                    vec![]
                })
            };
            (id, SslKeyPair { cert: field(TLS_CERT_KEY), key: field(TLS_PRIVATE_KEY_KEY) })
        })
        .collect()
}

/// CA bundles referenced by valid backends of the given groups.
pub fn build_cert_bundles(graph: &Graph, backend_groups: &[BackendGroup]) -> BTreeMap<CertBundleId, CertBundle> {
    if backend_groups.is_empty() {
        return BTreeMap::new();
    }

    let referenced: BTreeSet<&CertBundleId> = backend_groups
        .iter()
        .flat_map(|group| &group.backends)
        .filter(|backend| backend.valid)
        .filter_map(|backend| backend.verify_tls.as_ref())
        .filter_map(|verify| verify.cert_bundle_id())
        .collect();

    graph
        .referenced_ca_cert_config_maps
        .iter()
        .filter_map(|(key, config_map)| {
            let id = CertBundleId::new(key);
            if !referenced.contains(&id) {
                debug!("Skipping CA bundle {key} not used by any backend");
                return None;
            }
            let bundle = decode_ca_cert(&config_map.ca_cert);
            if bundle.is_empty() {
                warn!("CA bundle {key} is empty");
                return None;
            }
            Some((id, CertBundle(bundle)))
        })
        .collect()
}

/// The bundle may be stored base64 encoded, possibly line wrapped, or as plain PEM.
fn decode_ca_cert(ca_cert: &[u8]) -> Vec<u8> {
    let unwrapped: Vec<u8> = ca_cert.iter().copied().filter(|b| !matches!(b, b'\r' | b'\n')).collect();
    STANDARD.decode(unwrapped).unwrap_or_else(|_| ca_cert.to_vec())
}
