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
    domain::{Page, Stake, storage::stake::StakeStorage},
    infra::storage::postgres::{
        PostgresStorage, UNSPENT,
        keyset::{push_limit, push_order_by, push_seek},
    },
};
use fastrace::trace;
use indoc::{formatdoc, indoc};
use sqlx::QueryBuilder;

impl StakeStorage for PostgresStorage {
    #[trace(properties = { "stake_address": "{stake_address}" })]
    async fn get_stake(&self, stake_address: &str) -> Result<Option<Stake>, sqlx::Error> {
        let query = formatdoc! {"
            WITH sums AS (
                SELECT
                    stake_address.id,
                    COALESCE((
                        SELECT SUM(tx_out.value)
                        FROM tx_out
                        WHERE tx_out.stake_address_id = stake_address.id
                        AND {UNSPENT}
                    ), 0) AS utxo_sum,
                    COALESCE((
                        SELECT SUM(amount) FROM reward WHERE addr_id = stake_address.id
                    ), 0) AS rewards_sum,
                    COALESCE((
                        SELECT SUM(amount) FROM withdrawal WHERE addr_id = stake_address.id
                    ), 0) AS withdrawals_sum,
                    COALESCE((
                        SELECT SUM(amount) FROM reserve WHERE addr_id = stake_address.id
                    ), 0) AS reserves_sum,
                    COALESCE((
                        SELECT SUM(amount) FROM treasury WHERE addr_id = stake_address.id
                    ), 0) AS treasury_sum
                FROM stake_address
                WHERE stake_address.view = $1
            ),
            latest_delegation AS (
                SELECT delegation.active_epoch_no, pool_hash.view
                FROM sums
                JOIN delegation ON delegation.addr_id = sums.id
                JOIN pool_hash ON pool_hash.id = delegation.pool_hash_id
                ORDER BY delegation.tx_id DESC, delegation.cert_index DESC
                LIMIT 1
            )
            SELECT
                EXISTS (
                    SELECT 1
                    FROM stake_registration
                    WHERE stake_registration.addr_id = sums.id
                    AND NOT EXISTS (
                        SELECT 1
                        FROM stake_deregistration
                        WHERE stake_deregistration.addr_id = sums.id
                        AND stake_deregistration.tx_id > stake_registration.tx_id
                    )
                ) AS active,
                (SELECT active_epoch_no FROM latest_delegation)::BIGINT AS active_epoch,
                (utxo_sum + rewards_sum + reserves_sum + treasury_sum - withdrawals_sum)::TEXT
                    AS controlled_total_stake,
                rewards_sum::TEXT AS rewards_sum,
                withdrawals_sum::TEXT AS withdrawals_sum,
                reserves_sum::TEXT AS reserves_sum,
                treasury_sum::TEXT AS treasury_sum,
                (rewards_sum + reserves_sum + treasury_sum - withdrawals_sum)::TEXT
                    AS withdraw_available,
                (SELECT view FROM latest_delegation) AS pool_id
            FROM sums
        "};

        sqlx::query_as::<_, Stake>(&query)
            .bind(stake_address)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "stake_address": "{stake_address}" })]
    async fn get_stake_addresses(
        &self,
        stake_address: &str,
        page: &Page<String>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            SELECT tx_out.address
            FROM tx_out
            JOIN stake_address ON stake_address.id = tx_out.stake_address_id
            WHERE stake_address.view =
        "});
        builder.push_bind(stake_address.to_owned());
        push_seek(&mut builder, &["tx_out.address"], page);
        builder.push(" GROUP BY tx_out.address");
        push_order_by(&mut builder, &["tx_out.address"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_scalar::<String>()
            .fetch_all(&*self.pool)
            .await
    }
}
