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

use crate::{
    domain::{Page, Pool, PoolDelegation, PoolIdentifier, storage::pool::PoolStorage},
    infra::storage::postgres::{
        PostgresStorage, UNSPENT,
        keyset::{push_limit, push_order_by, push_seek},
    },
};
use fastrace::trace;
use indoc::{formatdoc, indoc};
use sqlx::{Postgres, QueryBuilder};

/// Pools with their latest registration; to be completed with a condition on `pool_hash`.
const POOL_QUERY: &str = indoc! {"
    SELECT
        pool_hash.view AS pool_id,
        pool_hash.hash_raw AS raw_id,
        pool_metadata_ref.url,
        pool_metadata_ref.hash,
        pool_update.pledge::TEXT AS pledge,
        pool_update.margin,
        pool_update.fixed_cost::TEXT AS fixed_cost,
        pool_update.active_epoch_no::BIGINT AS active_epoch_no
    FROM pool_hash
    LEFT JOIN LATERAL (
        SELECT *
        FROM pool_update
        WHERE pool_update.hash_id = pool_hash.id
        ORDER BY pool_update.registered_tx_id DESC, pool_update.cert_index DESC
        LIMIT 1
    ) AS pool_update ON TRUE
    LEFT JOIN pool_metadata_ref ON pool_metadata_ref.id = pool_update.meta_id
    WHERE
"};

impl PoolStorage for PostgresStorage {
    #[trace(properties = { "pool": "{pool:?}" })]
    async fn get_pool(&self, pool: &PoolIdentifier) -> Result<Option<Pool>, sqlx::Error> {
        let mut builder = QueryBuilder::new(POOL_QUERY);
        push_pool_condition(&mut builder, pool);

        builder
            .build_query_as::<Pool>()
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "slot_leader_id": "{slot_leader_id}" })]
    async fn get_pool_by_slot_leader(
        &self,
        slot_leader_id: u64,
    ) -> Result<Option<Pool>, sqlx::Error> {
        let query = format!(
            "{POOL_QUERY} pool_hash.id = (SELECT pool_hash_id FROM slot_leader WHERE id = $1)"
        );

        sqlx::query_as::<_, Pool>(&query)
            .bind(slot_leader_id as i64)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "pool": "{pool:?}" })]
    async fn get_pool_delegations(
        &self,
        pool: &PoolIdentifier,
        page: &Page<u64>,
    ) -> Result<Vec<PoolDelegation>, sqlx::Error> {
        let mut builder =
            QueryBuilder::new("WITH pool AS (SELECT pool_hash.id FROM pool_hash WHERE ");
        push_pool_condition(&mut builder, pool);
        builder.push(formatdoc! {"
            )
            SELECT
                stake_address.id AS stake_address_id,
                stake_address.view AS stake_address,
                COALESCE((
                    SELECT SUM(tx_out.value)
                    FROM tx_out
                    WHERE tx_out.stake_address_id = stake_address.id
                    AND {UNSPENT}
                ), 0)::TEXT AS stake
            FROM stake_address
            WHERE stake_address.id IN (
                SELECT delegation.addr_id
                FROM delegation
                WHERE delegation.pool_hash_id = (SELECT id FROM pool)
            )
            AND (
                SELECT latest.pool_hash_id
                FROM delegation AS latest
                WHERE latest.addr_id = stake_address.id
                ORDER BY latest.tx_id DESC, latest.cert_index DESC
                LIMIT 1
            ) = (SELECT id FROM pool)
            AND NOT EXISTS (
                SELECT 1
                FROM stake_deregistration
                WHERE stake_deregistration.addr_id = stake_address.id
                AND stake_deregistration.tx_id > (
                    SELECT MAX(delegation.tx_id)
                    FROM delegation
                    WHERE delegation.addr_id = stake_address.id
                )
            )
        "});
        push_seek(&mut builder, &["stake_address.id"], page);
        push_order_by(&mut builder, &["stake_address.id"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_as::<PoolDelegation>()
            .fetch_all(&*self.pool)
            .await
    }
}

fn push_pool_condition(builder: &mut QueryBuilder<'_, Postgres>, pool: &PoolIdentifier) {
    match pool {
        PoolIdentifier::View(view) => {
            builder.push("pool_hash.view = ").push_bind(view.to_owned());
        }

        PoolIdentifier::Hash(hash) => {
            builder.push("pool_hash.hash_raw = ").push_bind(*hash);
        }
    }
}
