// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use itertools::Itertools;
use kube_core::ObjectMeta;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::{Keyed, ResourceKey};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteType {
    #[default]
    #[serde(rename = "HTTPRoute")]
    Http,
    #[serde(rename = "GRPCRoute")]
    Grpc,
}

/// An HTTPRoute or a GRPCRoute after validation. gRPC matches arrive already expressed as HTTP path matches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct L7Route {
    pub source: ObjectMeta,
    #[builder(default)]
    #[serde(default)]
    pub route_type: RouteType,
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub valid: bool,
    #[builder(default)]
    #[serde(default)]
    pub parent_refs: Vec<ParentRef>,
    #[builder(default)]
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

impl Keyed for L7Route {
    fn key(&self) -> ResourceKey {
        ResourceKey::from(&self.source)
    }
}

impl L7Route {
    pub fn resource_key(&self) -> ResourceKey {
        self.key()
    }

    pub fn is_grpc(&self) -> bool {
        self.route_type == RouteType::Grpc
    }

    /// Hostnames this route was accepted under on the named listener, each once, in the order the parent refs list them.
    /// Parent refs whose attachment failed contribute nothing.
    pub fn accepted_hostnames(&self, listener_name: &str) -> Vec<String> {
        self.parent_refs
            .iter()
            .filter_map(|parent| parent.attachment.as_ref())
            .filter(|attachment| attachment.attached)
            .filter_map(|attachment| attachment.accepted_hostnames.get(listener_name))
            .flatten()
            .unique()
            .cloned()
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub gateway: ResourceKey,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub attachment: Option<ParentRefAttachment>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ParentRefAttachment {
    /// Listener name to the hostnames the route is accepted under on that listener.
    #[builder(default)]
    #[serde(default)]
    pub accepted_hostnames: BTreeMap<String, Vec<String>>,
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub attached: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub valid_matches: bool,
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub valid_filters: bool,
    #[builder(default)]
    #[serde(default)]
    pub matches: Vec<RouteMatch>,
    #[builder(default)]
    #[serde(default)]
    pub filters: Vec<HttpRouteFilter>,
    #[builder(default)]
    #[serde(default)]
    pub backend_refs: Vec<BackendRef>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathMatchType {
    Exact,
    #[default]
    PathPrefix,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathMatch {
    #[serde(default, rename = "type")]
    pub r#type: PathMatchType,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    #[serde(default)]
    pub path: Option<PathMatch>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Vec<HeaderMatch>,
    #[serde(default)]
    pub query_params: Vec<HeaderMatch>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderModifier {
    #[serde(default)]
    pub set: Vec<HttpHeader>,
    #[serde(default)]
    pub add: Vec<HttpHeader>,
    #[serde(default)]
    pub remove: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathModifierType {
    ReplaceFullPath,
    ReplacePrefixMatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathModifier {
    #[serde(rename = "type")]
    pub r#type: PathModifierType,
    #[serde(default)]
    pub replace_full_path: Option<String>,
    #[serde(default)]
    pub replace_prefix_match: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRedirectFilter {
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: Option<i32>,
    #[serde(default)]
    pub status_code: Option<i32>,
    #[serde(default)]
    pub path: Option<PathModifier>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRewriteFilter {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub path: Option<PathModifier>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMirrorFilter {
    pub backend_ref: ResourceKey,
    #[serde(default)]
    pub port: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRefFilter {
    pub group: String,
    pub kind: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HttpRouteFilter {
    RequestRedirect(RequestRedirectFilter),
    #[serde(rename = "URLRewrite")]
    UrlRewrite(UrlRewriteFilter),
    RequestHeaderModifier(HeaderModifier),
    ResponseHeaderModifier(HeaderModifier),
    RequestMirror(RequestMirrorFilter),
    ExtensionRef(ExtensionRefFilter),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    #[serde(default)]
    pub name: Option<String>,
    pub port: i32,
}

impl From<i32> for ServicePort {
    fn from(port: i32) -> Self {
        Self { name: None, port }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BackendTlsPolicy {
    #[builder(default)]
    #[serde(default)]
    pub source: ObjectMeta,
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub valid: bool,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub ca_cert_ref: Option<ResourceKey>,
    #[builder(setter(into))]
    pub hostname: String,
}

impl BackendTlsPolicy {
    pub fn ca_cert_ref(&self) -> Option<&ResourceKey> {
        self.ca_cert_ref.as_ref().filter(|reference| !reference.name.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BackendRef {
    #[serde(rename = "service")]
    pub svc_ns_name: ResourceKey,
    #[builder(setter(into))]
    pub service_port: ServicePort,
    #[builder(default = 1)]
    #[serde(default = "default_weight")]
    pub weight: i32,
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub valid: bool,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub backend_tls_policy: Option<BackendTlsPolicy>,
}

fn default_weight() -> i32 {
    1
}

impl BackendRef {
    /// Name of the upstream pool serving this reference. Unique per service and port.
    pub fn service_port_reference(&self) -> String {
        format!("{}_{}_{}", self.svc_ns_name.namespace, self.svc_ns_name.name, self.service_port.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_rules() {
        let m = r"
matches:
  - path:
      type: PathPrefix
      value: /v2
  - headers:
    - name: version
      value: two
filters:
  - type: RequestHeaderModifier
    set:
    - name: x-version
      value: two
  - type: URLRewrite
    path:
      type: ReplacePrefixMatch
      replacePrefixMatch: /
backendRefs:
  - service:
      namespace: infra
      name: infra-backend-v2
    servicePort:
      port: 8080
    weight: 0
";
        let rule: RouteRule = serde_yaml::from_str(m).unwrap();
        assert!(rule.valid_matches);
        assert!(rule.valid_filters);
        assert_eq!(rule.matches.len(), 2);
        assert_eq!(rule.matches[1].path, None);
        assert_eq!(rule.filters.len(), 2);
        assert!(matches!(rule.filters[1], HttpRouteFilter::UrlRewrite(_)));
        assert_eq!(rule.backend_refs[0].weight, 0);
        assert_eq!(rule.backend_refs[0].service_port_reference(), "infra_infra-backend-v2_8080");
    }

    #[test]
    fn accepted_hostnames_are_merged_across_parents() {
        let parent = |hostnames: &[&str]| {
            ParentRef::builder()
                .gateway(ResourceKey::new("gateway"))
                .attachment(
                    ParentRefAttachment::builder()
                        .accepted_hostnames(
                            [("http".to_owned(), hostnames.iter().map(|h| (*h).to_owned()).collect())].into_iter().collect(),
                        )
                        .build(),
                )
                .build()
        };

        let route = L7Route::builder()
            .source(ObjectMeta { name: Some("route".to_owned()), ..Default::default() })
            .parent_refs(vec![parent(&["foo.example.com", "bar.example.com"]), parent(&["foo.example.com", "baz.example.com"])])
            .build();

        assert_eq!(route.accepted_hostnames("http"), vec!["foo.example.com", "bar.example.com", "baz.example.com"]);
        assert!(route.accepted_hostnames("https").is_empty());
        assert_eq!(route.resource_key(), ResourceKey::new("route"));
    }

    #[test]
    fn detached_parents_contribute_no_hostnames() {
        let parent = |hostname: &str, attached: bool| {
            ParentRef::builder()
                .gateway(ResourceKey::new("gateway"))
                .attachment(
                    ParentRefAttachment::builder()
                        .accepted_hostnames([("http".to_owned(), vec![hostname.to_owned()])].into_iter().collect())
                        .attached(attached)
                        .build(),
                )
                .build()
        };

        let route = L7Route::builder()
            .source(ObjectMeta { name: Some("route".to_owned()), ..Default::default() })
            .parent_refs(vec![parent("foo.example.com", false), parent("bar.example.com", true)])
            .build();
        assert_eq!(route.accepted_hostnames("http"), vec!["bar.example.com"]);

        let yaml = r#"
gateway: { name: gateway, namespace: default }
attachment:
  attached: false
  acceptedHostnames:
    http: [foo.example.com]
"#;
        let detached: ParentRef = serde_yaml::from_str(yaml).unwrap();
        let route = L7Route::builder().source(ObjectMeta::default()).parent_refs(vec![detached]).build();
        assert!(route.accepted_hostnames("http").is_empty());
    }

    #[test]
    fn empty_ca_cert_ref_is_ignored() {
        let policy = BackendTlsPolicy::builder().ca_cert_ref(ResourceKey::new("")).hostname("foo.example.com").build();
        assert!(policy.ca_cert_ref().is_none());
    }
}
