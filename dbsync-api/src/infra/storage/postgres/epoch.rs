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
    domain::{Epoch, EpochParameters, storage::epoch::EpochStorage},
    infra::storage::postgres::PostgresStorage,
};
use fastrace::trace;
use indoc::indoc;

impl EpochStorage for PostgresStorage {
    #[trace]
    async fn get_latest_epoch(&self) -> Result<Option<Epoch>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                no::BIGINT AS no,
                out_sum::TEXT AS out_sum,
                fees::TEXT AS fees,
                tx_count::BIGINT AS tx_count,
                blk_count::BIGINT AS blk_count,
                EXTRACT(EPOCH FROM start_time)::BIGINT AS start_time,
                EXTRACT(EPOCH FROM end_time)::BIGINT AS end_time
            FROM epoch
            ORDER BY no DESC
            LIMIT 1
        "};

        sqlx::query_as::<_, Epoch>(query)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "epoch_no": "{epoch_no}" })]
    async fn get_epoch_parameters(
        &self,
        epoch_no: u64,
    ) -> Result<Option<EpochParameters>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                epoch_no::BIGINT AS epoch_no,
                min_fee_a::BIGINT AS min_fee_a,
                min_fee_b::BIGINT AS min_fee_b,
                max_block_size::BIGINT AS max_block_size,
                max_tx_size::BIGINT AS max_tx_size,
                max_bh_size::BIGINT AS max_block_header_size,
                key_deposit::TEXT AS key_deposit,
                pool_deposit::TEXT AS pool_deposit,
                max_epoch::BIGINT AS max_epoch,
                optimal_pool_count::BIGINT AS optimal_pool_count,
                influence AS influence_a0,
                monetary_expand_rate AS monetary_expand_rate_rho,
                treasury_growth_rate AS treasury_growth_rate_tau,
                decentralisation,
                protocol_major::BIGINT AS protocol_major,
                protocol_minor::BIGINT AS protocol_minor,
                min_utxo_value::TEXT AS min_utxo,
                min_pool_cost::TEXT AS min_pool_cost,
                nonce,
                coins_per_utxo_size::TEXT AS coins_per_utxo_size,
                price_mem,
                price_step,
                max_tx_ex_mem::TEXT AS max_tx_ex_mem,
                max_tx_ex_steps::TEXT AS max_tx_ex_steps,
                max_block_ex_mem::TEXT AS max_block_ex_mem,
                max_block_ex_steps::TEXT AS max_block_ex_steps,
                max_val_size::TEXT AS max_val_size,
                collateral_percent::BIGINT AS collateral_percent,
                max_collateral_inputs::BIGINT AS max_collateral_inputs,
                block_id
            FROM epoch_param
            WHERE epoch_no = $1
        "};

        sqlx::query_as::<_, EpochParameters>(query)
            .bind(epoch_no as i64)
            .fetch_optional(&*self.pool)
            .await
    }
}
