// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::{Resource, ResourceExt};
use kube_core::ObjectMeta;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE_NAME: &str = "default";

/// Namespaced name of a Kubernetes object. Objects of different kinds never share a map, so group and kind are not part of the key.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_owned(), ..Default::default() }
    }

    pub fn namespaced(name: &str, namespace: &str) -> Self {
        Self { name: name.to_owned(), namespace: namespace.to_owned() }
    }
}

impl Default for ResourceKey {
    fn default() -> Self {
        Self { namespace: DEFAULT_NAMESPACE_NAME.to_owned(), name: String::default() }
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

fn key_of<R>(value: &R) -> ResourceKey
where
    R: Resource,
{
    ResourceKey { namespace: value.namespace().unwrap_or(DEFAULT_NAMESPACE_NAME.to_owned()), name: value.name_any() }
}

impl From<&Secret> for ResourceKey {
    fn from(secret: &Secret) -> Self {
        key_of(secret)
    }
}

impl From<&ConfigMap> for ResourceKey {
    fn from(config_map: &ConfigMap) -> Self {
        key_of(config_map)
    }
}

impl From<&ObjectMeta> for ResourceKey {
    fn from(meta: &ObjectMeta) -> Self {
        let namespace = meta.namespace.clone().unwrap_or(DEFAULT_NAMESPACE_NAME.to_owned());

        let name = match (meta.name.as_ref(), meta.generate_name.as_ref()) {
            (None, None) => "",
            (Some(name), _) | (None, Some(name)) => name,
        };
        Self { namespace, name: name.to_owned() }
    }
}
