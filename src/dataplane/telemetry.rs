// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use super::types::{SpanAttribute, Telemetry};
use crate::graph::{Gateway, Graph};

/// Tracing exporter settings. `None` when no exporter is configured.
pub fn build_telemetry(graph: &Graph, gateway: &Gateway, controller_name: &str) -> Option<Telemetry> {
    let telemetry = graph.proxy_settings.as_ref()?.telemetry.as_ref()?;
    let exporter = telemetry.exporter.as_ref()?;

    let key = gateway.resource_key();
    let mut service_name = format!("{controller_name}:{}:{}", key.namespace, key.name);
    if let Some(name) = &telemetry.service_name {
        service_name = format!("{service_name}:{name}");
    }

    Some(Telemetry {
        endpoint: exporter.endpoint.clone(),
        service_name,
        interval: exporter.interval.clone().unwrap_or_default(),
        span_attributes: telemetry.span_attributes.iter().map(|a| SpanAttribute { key: a.key.clone(), value: a.value.clone() }).collect(),
        batch_size: exporter.batch_size.unwrap_or_default(),
        batch_count: exporter.batch_count.unwrap_or_default(),
    })
}
