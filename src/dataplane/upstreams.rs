// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{BuildError, types::Upstream};
use crate::{
    graph::{BackendRef, Gateway, Graph},
    resolver::ServiceResolver,
};

/// Valid backend references of the routable surface, one per upstream name.
pub fn collect_unique_backends<'a>(graph: &'a Graph, gateway: &'a Gateway) -> BTreeMap<String, &'a BackendRef> {
    let mut unique = BTreeMap::new();
    for listener in gateway.listeners.iter().filter(|l| l.valid) {
        for route in graph.attached_routes(listener).filter(|r| r.valid) {
            for rule in route.rules.iter().filter(|rule| rule.valid_matches && rule.valid_filters) {
                for backend_ref in rule.backend_refs.iter().filter(|b| b.valid) {
                    unique.entry(backend_ref.service_port_reference()).or_insert(backend_ref);
                }
            }
        }
    }
    unique
}

/// Resolves every unique upstream exactly once, at most `max_concurrent` at a time. The result is ordered by upstream name.
/// A resolver failure is recorded on its upstream. Cancellation discards everything resolved so far.
pub async fn build_upstreams(
    graph: &Graph,
    gateway: &Gateway,
    resolver: &dyn ServiceResolver,
    max_concurrent: usize,
    cancel: &CancellationToken,
) -> Result<Vec<Upstream>, BuildError> {
    let unique = collect_unique_backends(graph, gateway);
    debug!("Resolving {} unique upstreams", unique.len());

    let resolutions = stream::iter(unique)
        .map(|(name, backend_ref)| async move {
            match resolver.resolve(&backend_ref.svc_ns_name, &backend_ref.service_port).await {
                Ok(endpoints) => Upstream { name, error_msg: String::new(), endpoints },
                Err(e) => {
                    warn!("Unable to resolve upstream {name} {e}");
                    Upstream { name, error_msg: e.to_string(), endpoints: vec![] }
                },
            }
        })
        .buffered(max_concurrent.max(1))
        .collect::<Vec<_>>();

    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            warn!("Upstream resolution cancelled");
            Err(BuildError::Cancelled)
        },
        upstreams = resolutions => Ok(upstreams),
    }
}
