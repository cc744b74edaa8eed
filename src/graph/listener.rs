// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::ResourceKey;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Hash, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProtocolType {
    Http,
    Https,
    Tcp,
    Tls,
    Udp,
}

impl Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut e = format! {"{self:?}"};
        e.make_ascii_uppercase();
        write!(f, "{e}")
    }
}

/// A Gateway listener as left by validation: `valid` is final, `resolved_secret` is only set when the certificate reference
/// resolved, and `routes` lists every route attached to the listener whether or not the route itself is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    #[builder(setter(into))]
    pub name: String,
    pub protocol: ProtocolType,
    pub port: i32,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub hostname: Option<String>,
    #[builder(default = true)]
    #[serde(default = "super::valid_by_default")]
    pub valid: bool,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub resolved_secret: Option<ResourceKey>,
    #[builder(default)]
    #[serde(default)]
    pub routes: Vec<ResourceKey>,
}

impl Listener {
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref().filter(|hostname| !hostname.is_empty())
    }

    pub fn is_secure(&self) -> bool {
        self.protocol == ProtocolType::Https
    }
}
