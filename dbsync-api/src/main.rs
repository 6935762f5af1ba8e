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

#[tokio::main]
async fn main() {
    use dbsync_common::telemetry;
    use log::error;
    use std::panic;

    // Initialize logging.
    telemetry::init_logging();

    // Replace the default panic hook with one that uses structured logging at ERROR level.
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    // Run and log any error.
    if let Err(error) = run().await {
        let backtrace = error.backtrace();
        let error = format!("{error:#}");
        error!(error, backtrace:%; "process exited with ERROR")
    }
}

async fn run() -> anyhow::Result<()> {
    use anyhow::Context;
    use dbsync_api::{
        application,
        config::Config,
        domain::{Bridge, DbClient},
        infra::{
            self, listener::postgres::PostgresListener, storage::postgres::PostgresStorage,
        },
    };
    use dbsync_common::{
        config::ConfigExt,
        infra::{pool::postgres::PostgresPool, pub_sub::in_mem::InMemPubSub},
        telemetry,
    };
    use log::{error, info};
    use tokio::task;

    // Load configuration.
    let Config {
        application_config,
        infra_config,
        telemetry_config:
            telemetry::Config {
                tracing_config,
                metrics_config,
            },
    } = Config::load().context("load configuration")?;

    // Initialize tracing and metrics.
    telemetry::init_tracing(tracing_config).context("initialize tracing")?;
    telemetry::init_metrics(metrics_config).context("initialize metrics")?;

    info!(application_config:?, infra_config:?; "starting");

    let infra::Config { storage_config } = infra_config;

    let pool = PostgresPool::new(storage_config.clone())
        .await
        .context("create DB pool for Postgres")?;
    let storage = PostgresStorage::new(pool, storage_config.clone());
    let db_client = DbClient::new(storage);

    let listener_pool = PostgresPool::dedicated(storage_config)
        .await
        .context("create dedicated DB pool for notifications")?;
    let bridge = Bridge::new(PostgresListener::new(listener_pool));

    let pub_sub = InMemPubSub::default();
    let events = task::spawn(application::log_events(&pub_sub.subscriber()));
    let publisher = pub_sub.publisher();

    let result = application::run(application_config, bridge, db_client, publisher)
        .await
        .context("run dbsync-api application");
    events.abort();
    result?;

    error!("dbsync-api terminated");

    Ok(())
}
