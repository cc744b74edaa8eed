// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use serde::Deserialize;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{Result, dataplane::ALPINE_SSL_ROOT_CA_PATH};

const DEFAULT_CONTROLLER_NAME: &str = "ngf";
const DEFAULT_MAX_CONCURRENT_RESOLUTIONS: usize = 16;
const DEFAULT_OTLP_ENDPOINT: &str = "http://127.0.0.1:4317";

fn default_controller_name() -> String {
    DEFAULT_CONTROLLER_NAME.to_owned()
}

fn default_root_ca_path() -> String {
    ALPINE_SSL_ROOT_CA_PATH.to_owned()
}

fn default_max_concurrent_resolutions() -> usize {
    DEFAULT_MAX_CONCURRENT_RESOLUTIONS
}

fn default_otlp_endpoint() -> String {
    DEFAULT_OTLP_ENDPOINT.to_owned()
}

#[derive(Clone, Debug, PartialEq, TypedBuilder, Deserialize)]
pub struct Settings {
    #[builder(default = default_controller_name(), setter(into))]
    #[serde(default = "default_controller_name")]
    pub controller_name: String,
    #[builder(default = default_root_ca_path(), setter(into))]
    #[serde(default = "default_root_ca_path")]
    pub root_ca_path: String,
    #[builder(default = DEFAULT_MAX_CONCURRENT_RESOLUTIONS)]
    #[serde(default = "default_max_concurrent_resolutions")]
    pub max_concurrent_resolutions: usize,
    #[builder(default)]
    #[serde(default)]
    pub enable_open_telemetry: bool,
    #[builder(default = default_otlp_endpoint(), setter(into))]
    #[serde(default = "default_otlp_endpoint")]
    pub otlp_endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder().build()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("controller name must be not empty")]
    ControllerName,
    #[error("max concurrent resolutions must be greater than zero")]
    MaxConcurrentResolutions,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.controller_name.is_empty() {
            return Err(SettingsError::ControllerName.into());
        }
        if self.max_concurrent_resolutions == 0 {
            return Err(SettingsError::MaxConcurrentResolutions.into());
        }
        Ok(())
    }
}
