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

mod asset;
mod block;
mod epoch;
mod keyset;
mod pool;
mod script;
mod stake;
mod transaction;
mod utxo;

use crate::domain::storage::ConnectionStorage;
use dbsync_common::infra::pool::postgres::{Config, PostgresPool};
use log::info;

/// Postgres based implementation of [Storage](crate::domain::storage::Storage) over a
/// cardano-db-sync database.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PostgresPool,
    config: Config,
}

impl PostgresStorage {
    /// Create a new [PostgresStorage]; the config is used to reopen the pool once closed.
    pub fn new(pool: PostgresPool, config: Config) -> Self {
        Self { pool, config }
    }
}

impl ConnectionStorage for PostgresStorage {
    async fn close(&self) {
        self.pool.close().await;
        info!("closed Postgres connection pool");
    }

    async fn reopen(&self) -> Result<Self, sqlx::Error> {
        let pool = PostgresPool::new(self.config.clone())
            .await
            .map_err(|error| error.0)?;
        info!("reopened Postgres connection pool");

        Ok(Self::new(pool, self.config.clone()))
    }
}

/// Condition for an output not being consumed by any input, to be used with `tx_out` in scope.
const UNSPENT: &str = indoc::indoc! {"
    NOT EXISTS (
        SELECT 1
        FROM tx_in
        WHERE tx_in.tx_out_id = tx_out.tx_id
        AND tx_in.tx_out_index = tx_out.index
    )
"};
