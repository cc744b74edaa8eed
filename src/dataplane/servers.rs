// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use tracing::{debug, error};

use super::{
    BuildError,
    backend_groups::new_backend_group,
    converters::{convert_match, match_filters, path_and_type},
    types::{MatchRule, PathRule, PathType, Ssl, SslKeyPairId, VirtualServer},
};
use crate::graph::{Gateway, Graph, L7Route, Listener, ProtocolType, is_more_specific};

/// Server name matching every host. Used for listeners without a hostname.
pub const WILDCARD_HOSTNAME: &str = "~^";

pub fn listener_hostname(listener: &Listener) -> String {
    listener.hostname().unwrap_or(WILDCARD_HOSTNAME).to_owned()
}

/// Builds the plain and the TLS virtual servers. Both sequences are ordered by port, then hostname.
pub fn build_servers(graph: &Graph, gateway: &Gateway, root_ca_path: &str) -> Result<(Vec<VirtualServer>, Vec<VirtualServer>), BuildError> {
    let mut http_rules = PortPathRules::new();
    let mut ssl_rules = PortPathRules::new();

    for listener in gateway.listeners.iter().filter(|l| l.valid) {
        let rules = match listener.protocol {
            ProtocolType::Http => &mut http_rules,
            ProtocolType::Https => &mut ssl_rules,
            ProtocolType::Tcp | ProtocolType::Tls | ProtocolType::Udp => {
                debug!("Skipping listener {} with protocol {}", listener.name, listener.protocol);
                continue;
            },
        };
        rules.entry(listener.port).or_insert_with(|| HostPathRules::new(listener.port, root_ca_path)).upsert_listener(graph, listener);
    }

    Ok((build_port_servers(http_rules)?, build_port_servers(ssl_rules)?))
}

type PortPathRules<'a> = BTreeMap<i32, HostPathRules<'a>>;

fn build_port_servers(rules: PortPathRules<'_>) -> Result<Vec<VirtualServer>, BuildError> {
    let capacity = rules.values().map(HostPathRules::max_server_count).sum();
    rules.into_values().try_fold(Vec::with_capacity(capacity), |mut servers, rules| {
        servers.append(&mut rules.build_servers()?);
        Ok(servers)
    })
}

/// Sort key of the path rules of one server.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PathAndType {
    path: String,
    path_type: PathType,
}

/// Routing state of one port of one protocol.
struct HostPathRules<'a> {
    rules_per_host: BTreeMap<String, BTreeMap<PathAndType, PathRule>>,
    listeners_for_host: BTreeMap<String, &'a Listener>,
    https_listeners: Vec<&'a Listener>,
    listeners_exist: bool,
    port: i32,
    root_ca_path: &'a str,
}

impl<'a> HostPathRules<'a> {
    fn new(port: i32, root_ca_path: &'a str) -> Self {
        Self {
            rules_per_host: BTreeMap::new(),
            listeners_for_host: BTreeMap::new(),
            https_listeners: vec![],
            listeners_exist: false,
            port,
            root_ca_path,
        }
    }

    fn upsert_listener(&mut self, graph: &'a Graph, listener: &'a Listener) {
        self.listeners_exist = true;

        if listener.is_secure() {
            self.https_listeners.push(listener);
        }

        for route in graph.attached_routes(listener) {
            if route.valid {
                self.upsert_route(route, listener);
            } else {
                debug!("Skipping invalid route {} on listener {}", route.resource_key(), listener.name);
            }
        }
    }

    fn upsert_route(&mut self, route: &L7Route, listener: &'a Listener) {
        let hostnames = route.accepted_hostnames(&listener.name);
        let route_key = route.resource_key();
        let grpc = route.is_grpc();
        debug!("Route {route_key} accepted on listener {} for {hostnames:?}", listener.name);

        for hostname in &hostnames {
            match self.listeners_for_host.entry(hostname.clone()) {
                Entry::Occupied(mut owner) => {
                    if is_more_specific(listener.hostname(), owner.get().hostname()) {
                        debug!("Listener {} takes {hostname} over from listener {}", listener.name, owner.get().name);
                        owner.insert(listener);
                    }
                },
                Entry::Vacant(entry) => {
                    entry.insert(listener);
                },
            }
            self.rules_per_host.entry(hostname.clone()).or_default();
        }

        for (rule_idx, rule) in route.rules.iter().enumerate() {
            if !rule.valid_matches {
                debug!("Skipping rule {rule_idx} of route {route_key} with invalid matches");
                continue;
            }

            let filters = match_filters(rule);
            let backend_group = new_backend_group(&rule.backend_refs, &route_key, rule_idx, self.root_ca_path);

            for hostname in &hostnames {
                let host_rules = self.rules_per_host.entry(hostname.clone()).or_default();
                for route_match in &rule.matches {
                    let (path, path_type) = path_and_type(route_match);
                    let path_rule = host_rules.entry(PathAndType { path: path.clone(), path_type }).or_insert_with(|| PathRule {
                        path,
                        path_type,
                        match_rules: vec![],
                        grpc,
                    });
                    path_rule.grpc = grpc;
                    path_rule.match_rules.push(MatchRule {
                        filters: filters.clone(),
                        source: route.source.clone(),
                        r#match: convert_match(route_match),
                        backend_group: backend_group.clone(),
                    });
                }
            }
        }
    }

    fn build_servers(self) -> Result<Vec<VirtualServer>, BuildError> {
        let mut servers = Vec::with_capacity(self.max_server_count());

        for (hostname, rules) in self.rules_per_host {
            let Some(listener) = self.listeners_for_host.get(&hostname) else {
                error!("No listener found for hostname {hostname} on port {}", self.port);
                return Err(BuildError::MissingListenerForHostname { port: self.port, hostname });
            };

            servers.push(VirtualServer {
                ssl: ssl_for(listener),
                hostname,
                path_rules: rules.into_values().collect(),
                is_default: false,
                port: self.port,
            });
        }

        // listeners without routes, or matching every host, answer 404 instead of the default TLS server
        let mut owned_hostnames: BTreeSet<_> = servers.iter().map(|s| s.hostname.clone()).collect();
        for listener in &self.https_listeners {
            let hostname = listener_hostname(listener);
            if !(listener.routes.is_empty() || hostname == WILDCARD_HOSTNAME) {
                continue;
            }
            if owned_hostnames.insert(hostname.clone()) {
                servers.push(VirtualServer { ssl: ssl_for(listener), hostname, port: self.port, ..Default::default() });
            } else {
                debug!("Hostname {hostname} on port {} already has a server, skipping listener {}", self.port, listener.name);
            }
        }

        if self.listeners_exist {
            servers.push(VirtualServer { is_default: true, port: self.port, ..Default::default() });
        }

        servers.sort_by(|this, other| this.hostname.cmp(&other.hostname));
        Ok(servers)
    }

    fn max_server_count(&self) -> usize {
        self.rules_per_host.len() + self.https_listeners.len() + 1
    }
}

fn ssl_for(listener: &Listener) -> Option<Ssl> {
    listener.resolved_secret.as_ref().map(|secret| Ssl { key_pair_id: SslKeyPairId::new(secret) })
}
