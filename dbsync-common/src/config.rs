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

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;
use std::env;

const CONFIG_FILE: &str = "CONFIG_FILE";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const ENV_PREFIX: &str = "APP__";

/// Extension methods for "configuration structs" which can be deserialized.
pub trait ConfigExt
where
    Self: for<'de> Deserialize<'de>,
{
    /// Load the configuration from the YAML file named by the `CONFIG_FILE` environment variable,
    /// `config.yaml` if unset, overlaid by environment variables prefixed with `"APP__"` and
    /// nested via `"__"`, e.g. `APP__INFRA__STORAGE__PORT`.
    fn load() -> Result<Self, Box<figment::Error>> {
        let config_file = env::var(CONFIG_FILE)
            .map(Yaml::file_exact)
            .unwrap_or(Yaml::file_exact(DEFAULT_CONFIG_FILE));

        let config = Figment::new()
            .merge(config_file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}

impl<T> ConfigExt for T where T: for<'de> Deserialize<'de> {}

#[cfg(test)]
mod tests {
    use crate::{config::ConfigExt, telemetry};
    use figment::Jail;
    use serde::Deserialize;

    #[test]
    fn test_load() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                &lines(&[
                    "storage:",
                    "  host: localhost",
                    "  port: 5432",
                    "telemetry:",
                    "  tracing:",
                    "    enabled: true",
                ]),
            )?;
            jail.set_env("APP__STORAGE__PORT", "6543");

            let config = Config::load().map_err(|error| error.to_string())?;
            assert_eq!(config.storage.host, "localhost");
            assert_eq!(config.storage.port, 6543);
            assert!(config.telemetry.tracing.enabled);
            assert_eq!(
                config.telemetry.tracing.otlp_exporter_endpoint,
                "http://localhost:4317"
            );

            jail.set_env("CONFIG_FILE", "nonexistent.yaml");
            assert!(Config::load().is_err());

            Ok(())
        });
    }

    fn lines(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[derive(Debug, Deserialize)]
    struct Config {
        storage: StorageConfig,
        telemetry: TelemetryConfig,
    }

    #[derive(Debug, Deserialize)]
    struct StorageConfig {
        host: String,
        port: u16,
    }

    #[derive(Debug, Deserialize)]
    struct TelemetryConfig {
        #[serde(default)]
        tracing: telemetry::TracingConfig,
    }
}
