// This file is part of dbsync-reader.
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Telemetry: logging, tracing and metrics.
//!
//! ## Logging
//!
//! - Log through the `log` crate with its `kv` feature; records are emitted as JSON.
//! - Fields come first, comma separated, followed by a semicolon and the message:
//!   `warn!(channel, payload_len = payload.len(); "dropping notification")`.
//! - `:?` renders a field with `Debug`, `:%` with `Display`.
//! - Errors are logged with their full chain: `error!(error:% = error.as_chain(); "message")`.
//!
//! ## Tracing
//!
//! - Instrument functions and methods with `#[trace]`.
//! - Root spans are created with `Span::root("name", SpanContext::random())`.
//!
//! ## Metrics
//!
//! - Counters are recorded with the `metrics` macros and scraped via Prometheus.

use fastrace_opentelemetry::OpenTelemetryReporter;
use logforth::{
    append::{FastraceEvent, Stdout},
    diagnostic::FastraceDiagnostic,
    filter::EnvFilter,
    layout::JsonLayout,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::{InstrumentationScope, trace::SpanKind};
use metrics_exporter_prometheus::BuildError;
use opentelemetry_otlp::{ExporterBuildError, SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use serde::Deserialize;
use std::{
    borrow::Cow,
    net::{IpAddr, Ipv4Addr},
};
use thiserror::Error;

/// Telemetry configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "tracing", default)]
    pub tracing_config: TracingConfig,

    #[serde(rename = "metrics", default)]
    pub metrics_config: MetricsConfig,
}

/// Tracing configuration; every field has a deserialization default.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Defaults to false.
    #[serde(default)]
    pub enabled: bool,

    /// Defaults to OTLP gRPC: "http://localhost:4317".
    #[serde(default = "otlp_exporter_endpoint_default")]
    pub otlp_exporter_endpoint: String,

    /// Defaults to the package name.
    #[serde(default = "package_name")]
    pub service_name: String,

    /// Defaults to the package name.
    #[serde(default = "package_name")]
    pub instrumentation_scope_name: String,

    /// Defaults to the package version.
    #[serde(default = "package_version")]
    pub instrumentation_scope_version: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_exporter_endpoint: otlp_exporter_endpoint_default(),
            service_name: package_name(),
            instrumentation_scope_name: package_name(),
            instrumentation_scope_version: package_version(),
        }
    }
}

/// Metrics configuration; every field has a deserialization default.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Defaults to false.
    #[serde(default)]
    pub enabled: bool,

    /// Defaults to `"0.0.0.0"`.
    #[serde(default = "metrics_address_default")]
    pub address: IpAddr,

    /// Defaults to `9,000`.
    #[serde(default = "metrics_port_default")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: metrics_address_default(),
            port: metrics_port_default(),
        }
    }
}

/// Initialize logging with [Logforth](https://github.com/fast/logforth).
///
/// Levels are filtered via `RUST_LOG`, records are written to stdout as JSON and, within a span,
/// added to that span as events carrying its trace ID.
///
/// # Panics
///
/// If logging has already been initialized.
pub fn init_logging() {
    logforth::builder()
        .dispatch(|dispatch| {
            dispatch
                .filter(EnvFilter::from_default_env())
                .diagnostic(FastraceDiagnostic::default())
                .append(Stdout::default().with_layout(JsonLayout::default()))
                .append(FastraceEvent::default())
        })
        .apply();
}

/// Initialize tracing with [fastrace](https://github.com/fast/fastrace), reporting spans to an
/// OTLP gRPC endpoint. Does nothing unless enabled.
pub fn init_tracing(config: TracingConfig) -> Result<(), TelemetryError> {
    let TracingConfig {
        enabled,
        otlp_exporter_endpoint,
        service_name,
        instrumentation_scope_name,
        instrumentation_scope_version,
    } = config;

    if !enabled {
        return Ok(());
    }

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_exporter_endpoint)
        .build()?;

    let resource = Resource::builder().with_service_name(service_name).build();

    let instrumentation_scope = InstrumentationScope::builder(instrumentation_scope_name)
        .with_version(instrumentation_scope_version)
        .build();

    let reporter = OpenTelemetryReporter::new(
        exporter,
        SpanKind::Server,
        Cow::Owned(resource),
        instrumentation_scope,
    );

    fastrace::set_reporter(reporter, fastrace::collector::Config::default());
    Ok(())
}

/// Initialize metrics by installing a Prometheus exporter serving `/metrics`. Does nothing
/// unless enabled.
pub fn init_metrics(config: MetricsConfig) -> Result<(), TelemetryError> {
    let MetricsConfig {
        enabled,
        address,
        port,
    } = config;

    if enabled {
        PrometheusBuilder::new()
            .with_http_listener((address, port))
            .install()?;
    }

    Ok(())
}

/// Error possibly returned by [init_tracing] or [init_metrics].
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("cannot build OTLP span exporter")]
    Tracing(#[from] ExporterBuildError),

    #[error("cannot install Prometheus exporter")]
    Metrics(#[from] BuildError),
}

fn otlp_exporter_endpoint_default() -> String {
    "http://localhost:4317".to_string()
}

fn package_name() -> String {
    env!("CARGO_PKG_NAME").to_owned()
}

fn package_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

fn metrics_address_default() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn metrics_port_default() -> u16 {
    9_000
}

#[cfg(test)]
mod tests {
    use crate::telemetry::{Config, init_metrics, init_tracing};

    #[test]
    fn test_config_defaults() {
        let Config {
            tracing_config,
            metrics_config,
        } = serde_json::from_str::<Config>("{}").unwrap();

        assert!(!tracing_config.enabled);
        assert_eq!(tracing_config.service_name, "dbsync-common");
        assert!(tracing_config.instrumentation_scope_version.starts_with('v'));
        assert!(!metrics_config.enabled);
        assert_eq!(metrics_config.port, 9_000);

        // Disabled telemetry is a no-op.
        assert!(init_tracing(tracing_config).is_ok());
        assert!(init_metrics(metrics_config).is_ok());
    }
}
