// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! The validated input of a build. Every node carries the validity decided upstream; the builder only reads it.

mod hostname;
mod listener;
mod proxy;
mod references;
mod route;

use std::collections::BTreeMap;

pub use hostname::{Specificity, is_more_specific};
use kube_core::ObjectMeta;
pub use listener::{Listener, ProtocolType};
pub use proxy::{ProxySettings, SpanAttribute, TelemetryExporter, TelemetrySettings};
pub use references::{CA_CERT_KEY, CaCertConfigMap, Secret, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};
pub use route::{
    BackendRef, BackendTlsPolicy, ExtensionRefFilter, HeaderMatch, HeaderModifier, HttpHeader, HttpRouteFilter, L7Route, ParentRef,
    ParentRefAttachment, PathMatch, PathMatchType, PathModifier, PathModifierType, RequestMirrorFilter, RequestRedirectFilter, RouteMatch,
    RouteRule, RouteType, ServicePort, UrlRewriteFilter,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::common::{ResourceKey, keyed_map};

fn valid_by_default() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct GatewayClass {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default = true)]
    #[serde(default = "valid_by_default")]
    pub valid: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Gateway {
    pub source: ObjectMeta,
    #[builder(default)]
    #[serde(default)]
    pub listeners: Vec<Listener>,
}

impl Gateway {
    pub fn resource_key(&self) -> ResourceKey {
        ResourceKey::from(&self.source)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub gateway_class: Option<GatewayClass>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub gateway: Option<Gateway>,
    #[builder(default)]
    #[serde(default, with = "keyed_map")]
    pub routes: BTreeMap<ResourceKey, L7Route>,
    #[builder(default)]
    #[serde(default, with = "keyed_map")]
    pub referenced_secrets: BTreeMap<ResourceKey, Secret>,
    #[builder(default)]
    #[serde(default, with = "keyed_map")]
    pub referenced_ca_cert_config_maps: BTreeMap<ResourceKey, CaCertConfigMap>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub proxy_settings: Option<ProxySettings>,
}

impl Graph {
    /// Gateway to build from, provided its class is present and valid.
    pub fn buildable_gateway(&self) -> Option<&Gateway> {
        match (&self.gateway_class, &self.gateway) {
            (Some(class), Some(gateway)) if class.valid => Some(gateway),
            _ => None,
        }
    }

    /// Routes attached to the listener, in attachment order. Keys with no route in the graph are skipped.
    pub fn attached_routes<'a>(&'a self, listener: &'a Listener) -> impl Iterator<Item = &'a L7Route> + 'a {
        listener.routes.iter().filter_map(move |key| {
            let route = self.routes.get(key);
            if route.is_none() {
                warn!("Listener {} references unknown route {key}", listener.name);
            }
            route
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_from_yaml() {
        let g = r"
gatewayClass:
  name: nginx
gateway:
  source:
    name: gateway
    namespace: infra
  listeners:
  - name: http
    protocol: HTTP
    port: 80
    routes:
    - namespace: infra
      name: route
    - namespace: infra
      name: missing
routes:
- source:
    name: route
    namespace: infra
  rules:
  - matches:
    - path:
        type: Exact
        value: /coffee
";
        let graph: Graph = serde_yaml::from_str(g).unwrap();
        let gateway = graph.buildable_gateway().unwrap();
        assert_eq!(gateway.resource_key(), ResourceKey::namespaced("gateway", "infra"));
        let listener = &gateway.listeners[0];
        let routes: Vec<_> = graph.attached_routes(listener).collect();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].resource_key(), ResourceKey::namespaced("route", "infra"));
        assert!(graph.referenced_secrets.is_empty());
    }

    #[test]
    fn invalid_class_is_not_buildable() {
        let graph = Graph::builder()
            .gateway_class(GatewayClass::builder().name("nginx").valid(false).build())
            .gateway(Gateway::builder().source(ObjectMeta::default()).build())
            .build();
        assert!(graph.buildable_gateway().is_none());

        let graph = Graph::builder().gateway_class(GatewayClass::builder().name("nginx").build()).build();
        assert!(graph.buildable_gateway().is_none());
    }
}
