// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::cmp::Ordering;

/// How narrowly a listener hostname pattern matches. Greater is more specific.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    /// No hostname: the listener matches every host.
    Any,
    /// `*.example.com`, ranked by the number of labels after the wildcard.
    Wildcard(usize),
    Exact,
}

impl Specificity {
    pub fn of(hostname: Option<&str>) -> Self {
        match hostname {
            None | Some("" | "*") => Specificity::Any,
            Some(hostname) => match hostname.strip_prefix("*.") {
                Some(suffix) => Specificity::Wildcard(suffix.split('.').count()),
                None => Specificity::Exact,
            },
        }
    }
}

/// True only when `candidate` is strictly more specific than `current`; equally specific patterns never displace each other.
pub fn is_more_specific(candidate: Option<&str>, current: Option<&str>) -> bool {
    Specificity::of(candidate).cmp(&Specificity::of(current)) == Ordering::Greater
}
