// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use super::types::{
    HttpFilters, HttpHeader, HttpHeaderFilter, HttpPathModifier, HttpRequestRedirectFilter, HttpUrlRewriteFilter, Match, MatchFilters,
    PathModifierType, PathType,
};
use crate::graph::{self, HttpRouteFilter, RouteMatch, RouteRule};

const DEFAULT_PATH: &str = "/";

/// Path and path type of a match. A missing or empty path value matches everything under `/`.
pub fn path_and_type(route_match: &RouteMatch) -> (String, PathType) {
    let path_type = route_match.path.as_ref().map(|p| p.r#type).unwrap_or_default();
    let path = route_match
        .path
        .as_ref()
        .and_then(|p| p.value.as_deref())
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_PATH)
        .to_owned();
    (path, PathType::from(path_type))
}

impl From<graph::PathMatchType> for PathType {
    fn from(value: graph::PathMatchType) -> Self {
        match value {
            graph::PathMatchType::Exact => PathType::Exact,
            graph::PathMatchType::PathPrefix => PathType::Prefix,
        }
    }
}

pub fn convert_match(route_match: &RouteMatch) -> Match {
    Match {
        method: route_match.method.clone(),
        headers: route_match.headers.iter().map(|h| HttpHeader { name: h.name.clone(), value: h.value.clone() }).collect(),
        query_params: route_match.query_params.iter().map(|q| HttpHeader { name: q.name.clone(), value: q.value.clone() }).collect(),
    }
}

/// Filters for every match of a rule. A rule with invalid filters gets only the invalid marker.
pub fn match_filters(rule: &RouteRule) -> MatchFilters {
    if !rule.valid_filters {
        return MatchFilters::Invalid;
    }
    let filters = create_http_filters(&rule.filters);
    if filters.is_empty() { MatchFilters::None } else { MatchFilters::Filters(filters) }
}

/// Only the first filter of each kind is used. Mirror and extension filters have no data plane counterpart.
pub fn create_http_filters(filters: &[HttpRouteFilter]) -> HttpFilters {
    filters.iter().fold(HttpFilters::default(), |mut result, filter| {
        match filter {
            HttpRouteFilter::RequestRedirect(redirect) => {
                result.request_redirect.get_or_insert_with(|| HttpRequestRedirectFilter::from(redirect));
            },
            HttpRouteFilter::UrlRewrite(rewrite) => {
                result.request_url_rewrite.get_or_insert_with(|| HttpUrlRewriteFilter::from(rewrite));
            },
            HttpRouteFilter::RequestHeaderModifier(modifier) => {
                result.request_header_modifiers.get_or_insert_with(|| HttpHeaderFilter::from(modifier));
            },
            HttpRouteFilter::ResponseHeaderModifier(modifier) => {
                result.response_header_modifiers.get_or_insert_with(|| HttpHeaderFilter::from(modifier));
            },
            HttpRouteFilter::RequestMirror(_) | HttpRouteFilter::ExtensionRef(_) => (),
        }
        result
    })
}

impl From<&graph::PathModifier> for HttpPathModifier {
    fn from(modifier: &graph::PathModifier) -> Self {
        match modifier.r#type {
            graph::PathModifierType::ReplaceFullPath => HttpPathModifier {
                replacement: modifier.replace_full_path.clone().unwrap_or_default(),
                r#type: PathModifierType::ReplaceFullPath,
            },
            graph::PathModifierType::ReplacePrefixMatch => HttpPathModifier {
                replacement: modifier.replace_prefix_match.clone().unwrap_or_default(),
                r#type: PathModifierType::ReplacePrefixMatch,
            },
        }
    }
}

impl From<&graph::RequestRedirectFilter> for HttpRequestRedirectFilter {
    fn from(redirect: &graph::RequestRedirectFilter) -> Self {
        HttpRequestRedirectFilter {
            scheme: redirect.scheme.clone(),
            hostname: redirect.hostname.clone(),
            port: redirect.port,
            status_code: redirect.status_code,
            path: redirect.path.as_ref().map(HttpPathModifier::from),
        }
    }
}

impl From<&graph::UrlRewriteFilter> for HttpUrlRewriteFilter {
    fn from(rewrite: &graph::UrlRewriteFilter) -> Self {
        HttpUrlRewriteFilter { hostname: rewrite.hostname.clone(), path: rewrite.path.as_ref().map(HttpPathModifier::from) }
    }
}

impl From<&graph::HeaderModifier> for HttpHeaderFilter {
    fn from(modifier: &graph::HeaderModifier) -> Self {
        let headers = |headers: &[graph::HttpHeader]| -> Vec<HttpHeader> {
            headers.iter().map(|h| HttpHeader { name: h.name.clone(), value: h.value.clone() }).collect()
        };
        HttpHeaderFilter { set: headers(&modifier.set), add: headers(&modifier.add), remove: modifier.remove.clone() }
    }
}
