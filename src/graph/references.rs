// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::api::core::v1::{ConfigMap, Secret as KubeSecret};
use serde::{Deserialize, Serialize};

use crate::common::{Keyed, ResourceKey};

pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";
pub const CA_CERT_KEY: &str = "ca.crt";

/// A TLS Secret referenced by a listener. Validation guarantees the certificate and key entries exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret {
    pub source: KubeSecret,
}

impl Keyed for Secret {
    fn key(&self) -> ResourceKey {
        ResourceKey::from(&self.source)
    }
}

impl From<KubeSecret> for Secret {
    fn from(source: KubeSecret) -> Self {
        Self { source }
    }
}

impl Secret {
    pub fn data(&self, key: &str) -> Option<&[u8]> {
        self.source.data.as_ref().and_then(|data| data.get(key)).map(|bytes| bytes.0.as_slice())
    }
}

/// A ConfigMap holding a CA bundle for backend TLS verification. The bundle may be stored base64 encoded or as plain PEM.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigMap", into = "ConfigMap")]
pub struct CaCertConfigMap {
    pub source: ConfigMap,
    pub ca_cert: Vec<u8>,
}

impl Keyed for CaCertConfigMap {
    fn key(&self) -> ResourceKey {
        ResourceKey::from(&self.source)
    }
}

impl CaCertConfigMap {
    pub fn from_config_map(source: ConfigMap) -> Self {
        let ca_cert = source
            .data
            .as_ref()
            .and_then(|data| data.get(CA_CERT_KEY))
            .map(|cert| cert.as_bytes().to_vec())
            .or_else(|| source.binary_data.as_ref().and_then(|data| data.get(CA_CERT_KEY)).map(|cert| cert.0.clone()))
            .unwrap_or_default();
        Self { source, ca_cert }
    }
}

impl From<ConfigMap> for CaCertConfigMap {
    fn from(source: ConfigMap) -> Self {
        Self::from_config_map(source)
    }
}

impl From<CaCertConfigMap> for ConfigMap {
    fn from(value: CaCertConfigMap) -> Self {
        value.source
    }
}
