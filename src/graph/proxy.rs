// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Proxy-level settings attached to the GatewayClass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ProxySettings {
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub telemetry: Option<TelemetrySettings>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySettings {
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub exporter: Option<TelemetryExporter>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub service_name: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub span_attributes: Vec<SpanAttribute>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryExporter {
    #[builder(setter(into))]
    pub endpoint: String,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub batch_size: Option<i32>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub batch_count: Option<i32>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub interval: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAttribute {
    pub key: String,
    pub value: String,
}
