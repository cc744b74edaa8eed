// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::sync::Arc;

use clap::Parser;
use dataplane_builder::{
    ConfigurationBuilder, Graph, Settings,
    resolver::{ServiceEndpoints, StaticServiceResolver},
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    Layer, Registry, filter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CommandArgs {
    /// Builder settings. Defaults apply when omitted.
    #[arg(long)]
    with_config_file: Option<String>,
    /// YAML document with `version`, `graph` and `endpoints`.
    #[arg(long)]
    with_graph_file: String,
}

/// Input of one build. `endpoints` feeds the static service resolver.
#[derive(Debug, Deserialize)]
struct BuildInput {
    #[serde(default)]
    version: u64,
    #[serde(default)]
    graph: Graph,
    #[serde(default)]
    endpoints: Vec<ServiceEndpoints>,
}

fn init_tracing_logging(settings: &Settings) -> dataplane_builder::Result<WorkerGuard> {
    let registry = Registry::default();
    let controller_name = settings.controller_name.clone();
    let file_appender = tracing_appender::rolling::never(".", "dataplane-builder.log");
    let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);
    let file_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_FILE_LOG").unwrap_or_else(|_| "debug".to_owned()));
    let console_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()));
    let tracing_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_TRACE_LOG").unwrap_or_else(|_| "info".to_owned()));

    // stdout carries the configuration
    let console_layer = fmt::layer()
        .event_format(fmt::format().compact())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_appender)
        .with_span_events(FmtSpan::NONE)
        .with_target(true)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(file_filter);

    if settings.enable_open_telemetry {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(settings.otlp_endpoint.clone())
            .with_timeout(std::time::Duration::from_secs(3))
            .build()?;

        let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_id_generator(RandomIdGenerator::default())
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(
                opentelemetry_sdk::Resource::builder()
                    .with_attributes(vec![opentelemetry::KeyValue::new("service.name", controller_name.clone())])
                    .build(),
            )
            .build();

        let tracer = tracer_provider.tracer(controller_name);
        let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

        registry.with(console_layer).with(file_layer).with(telemetry.with_filter(tracing_filter)).init();
    } else {
        registry.with(console_layer).with(file_layer).init();
    }
    Ok(guard)
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> dataplane_builder::Result<()> {
    let args = CommandArgs::parse();
    let settings: Settings = match &args.with_config_file {
        Some(config_file) => serde_yaml::from_str(&std::fs::read_to_string(config_file)?)?,
        None => Settings::default(),
    };
    let _guard = init_tracing_logging(&settings)?;
    settings.validate()?;

    let input: BuildInput = serde_yaml::from_str(&std::fs::read_to_string(&args.with_graph_file)?)?;
    info!("Building configuration version {} from {}", input.version, args.with_graph_file);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling build");
            interrupt.cancel();
        }
    });

    let resolver = Arc::new(StaticServiceResolver::new(input.endpoints));
    let builder = ConfigurationBuilder::builder().settings(settings).resolver(resolver).build();
    let configuration = builder.build(&input.graph, input.version, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&configuration)?);
    Ok(())
}
