// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Compiles a validated [`Graph`] into the [`Configuration`] consumed by the data plane renderer.

mod backend_groups;
mod certificates;
mod converters;
mod servers;
mod telemetry;
#[cfg(test)]
mod test;
mod types;
mod upstreams;

use std::sync::Arc;

pub use backend_groups::ALPINE_SSL_ROOT_CA_PATH;
pub use servers::WILDCARD_HOSTNAME;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use typed_builder::TypedBuilder;
pub use types::{
    Backend, BackendGroup, CertBundle, CertBundleId, Configuration, HttpFilters, HttpHeader, HttpHeaderFilter, HttpPathModifier,
    HttpRequestRedirectFilter, HttpUrlRewriteFilter, Match, MatchFilters, MatchRule, PathModifierType, PathRule, PathType, SpanAttribute,
    Ssl, SslKeyPair, SslKeyPairId, Telemetry, TrustedCertificate, Upstream, VerifyTls, VirtualServer,
};

use crate::{graph::Graph, resolver::ServiceResolver, settings::Settings};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The aggregator registered a hostname without an owning listener.
    #[error("no listener owns hostname {hostname} on port {port}")]
    MissingListenerForHostname { port: i32, hostname: String },
    #[error("build cancelled")]
    Cancelled,
}

#[derive(TypedBuilder)]
pub struct ConfigurationBuilder {
    #[builder(default)]
    settings: Settings,
    resolver: Arc<dyn ServiceResolver>,
}

impl ConfigurationBuilder {
    /// Builds the whole configuration or nothing. A graph without a valid gateway class or without a gateway yields an
    /// empty configuration carrying only `version`.
    #[instrument(level = "info", name = "ConfigurationBuilder", skip_all, fields(version = version))]
    pub async fn build(&self, graph: &Graph, version: u64, cancel: &CancellationToken) -> Result<Configuration, BuildError> {
        let Some(gateway) = graph.buildable_gateway() else {
            info!("No valid gateway class or gateway, building empty configuration");
            return Ok(Configuration::empty(version));
        };
        debug!("Building configuration for gateway {}", gateway.resource_key());

        let (http_servers, ssl_servers) = servers::build_servers(graph, gateway, &self.settings.root_ca_path)?;
        let backend_groups = backend_groups::build_backend_groups(http_servers.iter().chain(&ssl_servers));
        let upstreams =
            upstreams::build_upstreams(graph, gateway, self.resolver.as_ref(), self.settings.max_concurrent_resolutions, cancel).await?;
        let ssl_key_pairs = certificates::build_ssl_key_pairs(graph, gateway);
        let cert_bundles = certificates::build_cert_bundles(graph, &backend_groups);
        let telemetry = telemetry::build_telemetry(graph, gateway, &self.settings.controller_name);

        info!(
            "Built configuration http servers {} ssl servers {} upstreams {} backend groups {} key pairs {} cert bundles {}",
            http_servers.len(),
            ssl_servers.len(),
            upstreams.len(),
            backend_groups.len(),
            ssl_key_pairs.len(),
            cert_bundles.len()
        );

        Ok(Configuration { ssl_key_pairs, cert_bundles, http_servers, ssl_servers, upstreams, backend_groups, telemetry, version })
    }
}
