// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{BuildError, CertBundleId, Configuration, ConfigurationBuilder, MatchFilters, PathType, SslKeyPairId, WILDCARD_HOSTNAME};
use crate::{
    common::ResourceKey,
    graph::{Graph, ServicePort},
    resolver::{Endpoint, ServiceEndpoints, ServiceResolver, StaticServiceResolver},
    settings::Settings,
};

const CAFE: &str = r"
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
    - { namespace: cafe, name: coffee }
    - { namespace: cafe, name: tea }
  - name: https
    protocol: HTTPS
    port: 443
    hostname: cafe.example.com
    resolvedSecret: { namespace: infra, name: cafe-secret }
    routes:
    - { namespace: cafe, name: coffee }
  - name: https-wildcard
    protocol: HTTPS
    port: 443
    resolvedSecret: { namespace: infra, name: wildcard-secret }
  - name: tcp
    protocol: TCP
    port: 9000
routes:
- source: { name: coffee, namespace: cafe }
  parentRefs:
  - gateway: { namespace: infra, name: gateway }
    attachment:
      acceptedHostnames:
        http: [cafe.example.com]
        https: [cafe.example.com]
  rules:
  - matches:
    - path: { type: PathPrefix, value: /coffee }
    backendRefs:
    - service: { namespace: cafe, name: coffee }
      servicePort: { port: 80 }
      backendTlsPolicy:
        caCertRef: { namespace: cafe, name: coffee-ca }
        hostname: coffee.cafe.svc
    - service: { namespace: cafe, name: coffee-canary }
      servicePort: { port: 80 }
      weight: 0
- source: { name: tea, namespace: cafe }
  parentRefs:
  - gateway: { namespace: infra, name: gateway }
    attachment:
      acceptedHostnames:
        http: [cafe.example.com]
  rules:
  - matches:
    - path: { type: Exact, value: /tea }
      method: GET
    filters:
    - type: RequestHeaderModifier
      add:
      - { name: x-tea, value: green }
    backendRefs:
    - service: { namespace: cafe, name: tea }
      servicePort: { port: 80 }
  - validFilters: false
    matches:
    - path: { type: PathPrefix, value: /tea/broken }
    backendRefs:
    - service: { namespace: cafe, name: tea-broken }
      servicePort: { port: 80 }
referencedSecrets:
- apiVersion: v1
  kind: Secret
  metadata:
    name: cafe-secret
    namespace: infra
  type: kubernetes.io/tls
  data:
    tls.crt: Y2VydA==
    tls.key: a2V5
- apiVersion: v1
  kind: Secret
  metadata:
    name: wildcard-secret
    namespace: infra
  type: kubernetes.io/tls
  data:
    tls.crt: Y2VydA==
    tls.key: a2V5
- apiVersion: v1
  kind: Secret
  metadata:
    name: unused-secret
    namespace: infra
  type: kubernetes.io/tls
  data:
    tls.crt: Y2VydA==
    tls.key: a2V5
referencedCaCertConfigMaps:
- apiVersion: v1
  kind: ConfigMap
  metadata:
    name: coffee-ca
    namespace: cafe
  data:
    ca.crt: Y2EtY2VydA==
- apiVersion: v1
  kind: ConfigMap
  metadata:
    name: unused-ca
    namespace: cafe
  data:
    ca.crt: Y2EtY2VydA==
proxySettings:
  telemetry:
    exporter:
      endpoint: otel.infra.svc:4317
      interval: 5s
";

fn cafe_graph() -> Graph {
    serde_yaml::from_str(CAFE).unwrap()
}

fn cafe_resolver() -> Arc<dyn ServiceResolver> {
    Arc::new(StaticServiceResolver::new(vec![
        ServiceEndpoints {
            service: ResourceKey::namespaced("coffee", "cafe"),
            port: 80,
            endpoints: vec![Endpoint::builder().address("10.0.0.1").port(8080).build()],
        },
        ServiceEndpoints {
            service: ResourceKey::namespaced("tea", "cafe"),
            port: 80,
            endpoints: vec![
                Endpoint::builder().address("10.0.0.2").port(8080).build(),
                Endpoint::builder().address("fd00::2").port(8080).ipv6(true).build(),
            ],
        },
    ]))
}

fn builder() -> ConfigurationBuilder {
    ConfigurationBuilder::builder().resolver(cafe_resolver()).build()
}

async fn build(graph: &Graph) -> Configuration {
    builder().build(graph, 1, &CancellationToken::new()).await.unwrap()
}

struct PendingResolver;

#[async_trait]
impl ServiceResolver for PendingResolver {
    async fn resolve(&self, _: &ResourceKey, _: &ServicePort) -> crate::Result<Vec<Endpoint>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![])
    }
}

#[tokio::test]
pub async fn test_empty_configuration_without_buildable_gateway() {
    let mut graph = cafe_graph();
    if let Some(class) = graph.gateway_class.as_mut() {
        class.valid = false;
    }
    let configuration = builder().build(&graph, 7, &CancellationToken::new()).await.unwrap();
    assert_eq!(configuration, Configuration::empty(7));

    let mut graph = cafe_graph();
    graph.gateway = None;
    assert_eq!(builder().build(&graph, 8, &CancellationToken::new()).await.unwrap(), Configuration::empty(8));

    let configuration = builder().build(&Graph::default(), 9, &CancellationToken::new()).await.unwrap();
    assert_eq!(configuration, Configuration::empty(9));
}

#[tokio::test]
pub async fn test_http_servers() {
    let configuration = build(&cafe_graph()).await;
    assert_eq!(configuration.version, 1);

    let hostnames: Vec<_> = configuration.http_servers.iter().map(|s| (s.port, s.hostname.as_str(), s.is_default)).collect();
    assert_eq!(hostnames, vec![(80, "", true), (80, "cafe.example.com", false)]);

    let server = &configuration.http_servers[1];
    assert!(server.ssl.is_none());
    let paths: Vec<_> = server.path_rules.iter().map(|r| (r.path.as_str(), r.path_type)).collect();
    assert_eq!(paths, vec![("/coffee", PathType::Prefix), ("/tea", PathType::Exact), ("/tea/broken", PathType::Prefix)]);

    let tea = &server.path_rules[1].match_rules[0];
    assert_eq!(tea.r#match.method.as_deref(), Some("GET"));
    let MatchFilters::Filters(filters) = &tea.filters else {
        panic!("expected filters {:?}", tea.filters);
    };
    assert_eq!(filters.request_header_modifiers.as_ref().map(|m| m.add.len()), Some(1));
    assert_eq!(tea.backend_group.name(), "cafe__tea_rule0");

    let broken = &server.path_rules[2].match_rules[0];
    assert_eq!(broken.filters, MatchFilters::Invalid);
    assert_eq!(broken.backend_group.name(), "cafe__tea_rule1");
}

#[tokio::test]
pub async fn test_ssl_servers_and_default_tls_server() {
    let configuration = build(&cafe_graph()).await;

    let servers: Vec<_> = configuration
        .ssl_servers
        .iter()
        .map(|s| (s.hostname.as_str(), s.is_default, s.ssl.as_ref().map(|ssl| ssl.key_pair_id.as_str()), s.path_rules.len()))
        .collect();
    assert_eq!(
        servers,
        vec![
            ("", true, None, 0),
            ("cafe.example.com", false, Some("ssl_keypair_infra_cafe-secret"), 1),
            (WILDCARD_HOSTNAME, false, Some("ssl_keypair_infra_wildcard-secret"), 0),
        ]
    );
    assert!(configuration.ssl_servers.iter().all(|s| s.port == 443));
}

#[tokio::test]
pub async fn test_backend_groups_are_deduplicated() {
    let configuration = build(&cafe_graph()).await;
    let names: Vec<_> = configuration.backend_groups.iter().map(super::BackendGroup::name).collect();
    assert_eq!(names, vec!["cafe__coffee_rule0", "cafe__tea_rule0", "cafe__tea_rule1"]);

    let coffee = &configuration.backend_groups[0];
    let backends: Vec<_> = coffee.backends.iter().map(|b| (b.upstream_name.as_str(), b.weight)).collect();
    assert_eq!(backends, vec![("cafe_coffee_80", 1), ("cafe_coffee-canary_80", 0)]);
    let verify = coffee.backends[0].verify_tls.as_ref().unwrap();
    assert_eq!(verify.hostname, "coffee.cafe.svc");
    assert_eq!(verify.cert_bundle_id().map(CertBundleId::as_str), Some("cert_bundle_cafe_coffee-ca"));
}

#[tokio::test]
pub async fn test_upstreams_isolate_resolver_failures() {
    let configuration = build(&cafe_graph()).await;
    let upstreams: Vec<_> =
        configuration.upstreams.iter().map(|u| (u.name.as_str(), u.endpoints.len(), u.error_msg.as_str())).collect();
    assert_eq!(
        upstreams,
        vec![("cafe_coffee-canary_80", 0, "service cafe/coffee-canary not found"), ("cafe_coffee_80", 1, ""), ("cafe_tea_80", 2, "")]
    );
    assert!(configuration.upstreams[2].endpoints[1].ipv6);
}

#[tokio::test]
pub async fn test_certificates_are_gated() {
    let configuration = build(&cafe_graph()).await;

    let key_pairs: Vec<_> = configuration.ssl_key_pairs.keys().map(SslKeyPairId::as_str).collect();
    assert_eq!(key_pairs, vec!["ssl_keypair_infra_cafe-secret", "ssl_keypair_infra_wildcard-secret"]);
    let pair = &configuration.ssl_key_pairs[&SslKeyPairId::new(&ResourceKey::namespaced("cafe-secret", "infra"))];
    assert_eq!(pair.cert, b"cert");
    assert_eq!(pair.key, b"key");

    let bundles: Vec<_> = configuration.cert_bundles.iter().map(|(id, bundle)| (id.as_str(), bundle.0.as_slice())).collect();
    assert_eq!(bundles, vec![("cert_bundle_cafe_coffee-ca", b"ca-cert".as_slice())]);
}

#[tokio::test]
pub async fn test_telemetry() {
    let configuration = build(&cafe_graph()).await;
    let telemetry = configuration.telemetry.unwrap();
    assert_eq!(telemetry.endpoint, "otel.infra.svc:4317");
    assert_eq!(telemetry.service_name, "ngf:infra:gateway");
    assert_eq!(telemetry.interval, "5s");

    let settings = Settings::builder().controller_name("gateway-controller").build();
    let builder = ConfigurationBuilder::builder().settings(settings).resolver(cafe_resolver()).build();
    let configuration = builder.build(&cafe_graph(), 1, &CancellationToken::new()).await.unwrap();
    assert_eq!(configuration.telemetry.map(|t| t.service_name).as_deref(), Some("gateway-controller:infra:gateway"));
}

#[tokio::test]
pub async fn test_builds_are_deterministic() {
    let graph = cafe_graph();
    let first = build(&graph).await;
    let second = build(&graph).await;
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
}

#[tokio::test(start_paused = true)]
pub async fn test_cancelled_build_is_discarded() {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let builder = ConfigurationBuilder::builder().resolver(Arc::new(PendingResolver)).build();
    assert_eq!(builder.build(&cafe_graph(), 1, &cancel).await, Err(BuildError::Cancelled));
}

#[tokio::test]
pub async fn test_configuration_json() {
    let configuration = build(&cafe_graph()).await;
    let json = serde_json::to_value(&configuration).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["sslServers"][2]["hostname"], WILDCARD_HOSTNAME);
    assert_eq!(json["httpServers"][1]["pathRules"][2]["pathType"], "prefix");
    assert_eq!(json["httpServers"][1]["pathRules"][2]["matchRules"][0]["filters"]["kind"], "Invalid");
    assert_eq!(json["upstreams"][0]["errorMsg"], "service cafe/coffee-canary not found");
}
