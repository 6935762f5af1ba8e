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

use crate::domain::{Listener, RawNotification};
use dbsync_common::{error::StdErrorExt, infra::pool::postgres::PostgresPool};
use derive_more::Debug;
use log::{debug, warn};
use sqlx::postgres::PgListener;

/// Postgres based implementation of [Listener] using `LISTEN` on a connection taken from a
/// dedicated pool, which must not be used for queries.
///
/// Contrary to [PgListener] a lost connection is not reestablished transparently: `recv` returns
/// `None` and the listener stays closed until `listen` is called again.
#[derive(Debug)]
pub struct PostgresListener {
    pool: PostgresPool,

    #[debug(skip)]
    listener: Option<PgListener>,
}

impl PostgresListener {
    pub fn new(pool: PostgresPool) -> Self {
        Self {
            pool,
            listener: None,
        }
    }
}

impl Listener for PostgresListener {
    type Error = sqlx::Error;

    async fn listen(&mut self, channels: &[String]) -> Result<(), Self::Error> {
        self.close().await;

        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener
            .listen_all(channels.iter().map(String::as_str))
            .await?;
        debug!(channels:?; "listening on dedicated connection");

        self.listener = Some(listener);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<RawNotification>, Self::Error> {
        let Some(listener) = self.listener.as_mut() else {
            return Ok(None);
        };

        match listener.try_recv().await {
            Ok(Some(notification)) => Ok(Some(RawNotification {
                channel: notification.channel().to_owned(),
                payload: notification.payload().to_owned(),
            })),

            Ok(None) => {
                self.listener = None;
                Ok(None)
            }

            Err(error) => {
                self.listener = None;
                Err(error)
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut listener) = self.listener.take() {
            if let Err(error) = listener.unlisten_all().await {
                warn!(error:% = error.as_chain(); "cannot unlisten, dropping connection");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::Listener,
        infra::listener::postgres::PostgresListener,
    };
    use anyhow::Context;
    use assert_matches::assert_matches;
    use dbsync_common::infra::pool::postgres::{Config, PostgresPool};
    use sqlx::postgres::PgSslMode;
    use std::{error::Error as StdError, time::Duration};
    use testcontainers::{ImageExt, runners::AsyncRunner};
    use testcontainers_modules::postgres::Postgres;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_listen() -> Result<(), Box<dyn StdError>> {
        let postgres_container = Postgres::default()
            .with_db_name("cexplorer")
            .with_user("dbsync")
            .with_password("dbsync")
            .with_tag("17.1-alpine")
            .start()
            .await
            .context("start Postgres container")?;
        let postgres_port = postgres_container
            .get_host_port_ipv4(5432)
            .await
            .context("get Postgres port")?;

        let config = Config {
            host: "localhost".to_string(),
            port: postgres_port,
            dbname: "cexplorer".to_string(),
            user: "dbsync".to_string(),
            password: "dbsync".into(),
            sslmode: PgSslMode::Prefer,
            max_connections: 2,
            idle_timeout: Duration::from_secs(60),
            max_lifetime: Duration::from_secs(5 * 60),
        };
        let pool = PostgresPool::new(config.clone()).await?;

        let mut listener = PostgresListener::new(PostgresPool::dedicated(config).await?);
        assert_matches!(listener.recv().await, Ok(None));

        listener.listen(&["new_block".to_string()]).await?;
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind("new_block")
            .bind(r#"{"record":{"id":1}}"#)
            .execute(&*pool)
            .await?;

        let notification = listener.recv().await?;
        assert_matches!(
            notification,
            Some(notification)
                if notification.channel == "new_block"
                    && notification.payload == r#"{"record":{"id":1}}"#
        );

        listener.close().await;
        assert_matches!(listener.recv().await, Ok(None));

        Ok(())
    }
}
