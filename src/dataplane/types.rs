// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{collections::BTreeMap, fmt::Display};

use kube_core::ObjectMeta;
use serde::Serialize;

use crate::{common::ResourceKey, resolver::Endpoint};

/// Intermediate representation of the data plane configuration handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub ssl_key_pairs: BTreeMap<SslKeyPairId, SslKeyPair>,
    pub cert_bundles: BTreeMap<CertBundleId, CertBundle>,
    pub http_servers: Vec<VirtualServer>,
    pub ssl_servers: Vec<VirtualServer>,
    pub upstreams: Vec<Upstream>,
    pub backend_groups: Vec<BackendGroup>,
    /// `None` disables tracing.
    pub telemetry: Option<Telemetry>,
    pub version: u64,
}

impl Configuration {
    pub fn empty(version: u64) -> Self {
        Self { version, ..Default::default() }
    }
}

/// Key pair identifier, safe to use as a file name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SslKeyPairId(String);

impl SslKeyPairId {
    pub fn new(secret: &ResourceKey) -> Self {
        Self(format!("ssl_keypair_{}_{}", secret.namespace, secret.name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SslKeyPairId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// CA bundle identifier, safe to use as a file name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CertBundleId(String);

impl CertBundleId {
    pub fn new(config_map: &ResourceKey) -> Self {
        Self(format!("cert_bundle_{}_{}", config_map.namespace, config_map.name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CertBundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CertBundle(pub Vec<u8>);

impl std::fmt::Debug for CertBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CertBundle").field(&format!("{} bytes", self.0.len())).finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SslKeyPair {
    pub cert: Vec<u8>,
    pub key: Vec<u8>,
}

impl std::fmt::Debug for SslKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SslKeyPair").field("cert", &"--- SENSITIVE DATA ----").field("key", &"--- SENSITIVE DATA ----").finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ssl {
    pub key_pair_id: SslKeyPairId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServer {
    pub ssl: Option<Ssl>,
    /// Empty for the default server of a port.
    pub hostname: String,
    pub path_rules: Vec<PathRule>,
    pub is_default: bool,
    pub port: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Upstream {
    /// Unique for each service and port.
    pub name: String,
    /// Set when the endpoints could not be resolved.
    pub error_msg: String,
    pub endpoints: Vec<Endpoint>,
}

/// Ordered so that `Exact` sorts before `Prefix`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    Exact,
    Prefix,
}

impl Display for PathType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathType::Exact => f.write_str("exact"),
            PathType::Prefix => f.write_str("prefix"),
        }
    }
}

/// Routing rules sharing one path.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRule {
    pub path: String,
    pub path_type: PathType,
    /// In the order the routes and rules were attached. Gateway API match precedence is applied by the renderer.
    pub match_rules: Vec<MatchRule>,
    pub grpc: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HttpHeaderFilter {
    pub set: Vec<HttpHeader>,
    pub add: Vec<HttpHeader>,
    pub remove: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PathModifierType {
    ReplaceFullPath,
    ReplacePrefixMatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HttpPathModifier {
    pub replacement: String,
    #[serde(rename = "type")]
    pub r#type: PathModifierType,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestRedirectFilter {
    pub scheme: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<i32>,
    pub status_code: Option<i32>,
    pub path: Option<HttpPathModifier>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HttpUrlRewriteFilter {
    pub hostname: Option<String>,
    pub path: Option<HttpPathModifier>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpFilters {
    pub request_redirect: Option<HttpRequestRedirectFilter>,
    pub request_url_rewrite: Option<HttpUrlRewriteFilter>,
    pub request_header_modifiers: Option<HttpHeaderFilter>,
    pub response_header_modifiers: Option<HttpHeaderFilter>,
}

impl HttpFilters {
    pub fn is_empty(&self) -> bool {
        self == &HttpFilters::default()
    }
}

/// Filters attached to a match rule. `Invalid` means the rule's filters failed validation and the data plane must answer with a
/// server error instead of applying anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "filters")]
pub enum MatchFilters {
    #[default]
    None,
    Filters(HttpFilters),
    Invalid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub method: Option<String>,
    pub headers: Vec<HttpHeader>,
    pub query_params: Vec<HttpHeader>,
}

/// One match of one route rule.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    pub filters: MatchFilters,
    /// Metadata of the route the rule belongs to.
    pub source: ObjectMeta,
    pub r#match: Match,
    pub backend_group: BackendGroup,
}

/// Backends of one route rule, identified by the route and the rule's index in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendGroup {
    pub source: ResourceKey,
    pub rule_idx: usize,
    pub backends: Vec<Backend>,
}

impl BackendGroup {
    /// Unique across routes and across the rules of one route. Follows the rule's current index in its route.
    pub fn name(&self) -> String {
        format!("{}__{}_rule{}", self.source.namespace, self.source.name, self.rule_idx)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    pub verify_tls: Option<VerifyTls>,
    pub upstream_name: String,
    /// 0 to 1,000,000. A zero weight backend receives no traffic but stays in its group.
    pub weight: i32,
    pub valid: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustedCertificate {
    CertBundle(CertBundleId),
    RootCaPath(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTls {
    pub trusted_certificate: TrustedCertificate,
    pub hostname: String,
}

impl VerifyTls {
    pub fn cert_bundle_id(&self) -> Option<&CertBundleId> {
        match &self.trusted_certificate {
            TrustedCertificate::CertBundle(id) => Some(id),
            TrustedCertificate::RootCaPath(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub endpoint: String,
    pub service_name: String,
    pub interval: String,
    pub span_attributes: Vec<SpanAttribute>,
    pub batch_size: i32,
    pub batch_count: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpanAttribute {
    pub key: String,
    pub value: String,
}
