// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Endpoint resolution for backend services. The builder only consumes the [`ServiceResolver`] trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{common::ResourceKey, graph::ServicePort};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TypedBuilder)]
pub struct Endpoint {
    #[builder(setter(into))]
    pub address: String,
    pub port: i32,
    #[builder(default)]
    #[serde(default)]
    pub ipv6: bool,
}

/// Resolves a service port to the endpoints backing it. Called concurrently for distinct services and ports.
#[async_trait]
pub trait ServiceResolver: Send + Sync {
    async fn resolve(&self, service: &ResourceKey, port: &ServicePort) -> crate::Result<Vec<Endpoint>>;
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("service {0} not found")]
    ServiceNotFound(ResourceKey),
    #[error("no matching port {port} for service {service}")]
    PortNotFound { service: ResourceKey, port: i32 },
    #[error("no valid endpoints found for service {service} on port {port}")]
    NoEndpoints { service: ResourceKey, port: i32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoints {
    pub service: ResourceKey,
    pub port: i32,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// In-memory resolver over a fixed table of service ports.
#[derive(Clone, Debug, Default)]
pub struct StaticServiceResolver {
    services: BTreeMap<ResourceKey, BTreeMap<i32, Vec<Endpoint>>>,
}

impl StaticServiceResolver {
    pub fn new(entries: impl IntoIterator<Item = ServiceEndpoints>) -> Self {
        let services = entries.into_iter().fold(BTreeMap::<ResourceKey, BTreeMap<i32, Vec<Endpoint>>>::new(), |mut acc, entry| {
            acc.entry(entry.service).or_default().entry(entry.port).or_default().extend(entry.endpoints);
            acc
        });
        Self { services }
    }

    fn lookup(&self, service: &ResourceKey, port: &ServicePort) -> Result<Vec<Endpoint>, ResolveError> {
        let ports = self.services.get(service).ok_or_else(|| ResolveError::ServiceNotFound(service.clone()))?;
        let endpoints = ports.get(&port.port).ok_or_else(|| ResolveError::PortNotFound { service: service.clone(), port: port.port })?;
        if endpoints.is_empty() {
            return Err(ResolveError::NoEndpoints { service: service.clone(), port: port.port });
        }
        Ok(endpoints.clone())
    }
}

#[async_trait]
impl ServiceResolver for StaticServiceResolver {
    async fn resolve(&self, service: &ResourceKey, port: &ServicePort) -> crate::Result<Vec<Endpoint>> {
        self.lookup(service, port).map_err(Into::into)
    }
}
