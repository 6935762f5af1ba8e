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
    domain::{Block, BlockSummary, storage::block::BlockStorage},
    infra::storage::postgres::PostgresStorage,
};
use dbsync_common::domain::BlockHash;
use fastrace::trace;
use indoc::indoc;

const BLOCK_QUERY: &str = indoc! {"
    SELECT
        block.id,
        block.hash,
        block.epoch_no::BIGINT AS epoch_no,
        block.slot_no::BIGINT AS slot_no,
        block.epoch_slot_no::BIGINT AS epoch_slot_no,
        block.block_no::BIGINT AS block_no,
        parent.block_no::BIGINT AS previous_block,
        (
            SELECT child.block_no
            FROM block AS child
            WHERE child.previous_id = block.id
            LIMIT 1
        )::BIGINT AS next_block,
        slot_leader.description AS slot_leader,
        block.size::BIGINT AS size,
        EXTRACT(EPOCH FROM block.time)::BIGINT AS time,
        block.tx_count::BIGINT AS tx_count,
        COALESCE((SELECT SUM(tx.out_sum) FROM tx WHERE tx.block_id = block.id), 0)::TEXT AS out_sum,
        COALESCE((SELECT SUM(tx.fee) FROM tx WHERE tx.block_id = block.id), 0)::TEXT AS fees,
        COALESCE((SELECT MAX(block_no) FROM block) - block.block_no + 1, 0)::BIGINT AS confirmations,
        block.op_cert,
        block.vrf_key
    FROM block
    JOIN slot_leader ON slot_leader.id = block.slot_leader_id
    LEFT JOIN block AS parent ON parent.id = block.previous_id
"};

impl BlockStorage for PostgresStorage {
    #[trace(properties = { "id": "{id}" })]
    async fn get_block_by_id(&self, id: u64) -> Result<Option<Block>, sqlx::Error> {
        let query = format!("{BLOCK_QUERY}WHERE block.id = $1");

        sqlx::query_as::<_, Block>(&query)
            .bind(id as i64)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "hash": "{hash}" })]
    async fn get_block_by_hash(&self, hash: BlockHash) -> Result<Option<Block>, sqlx::Error> {
        let query = format!("{BLOCK_QUERY}WHERE block.hash = $1");

        sqlx::query_as::<_, Block>(&query)
            .bind(hash)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace]
    async fn get_latest_block(&self) -> Result<Option<Block>, sqlx::Error> {
        let query = format!("{BLOCK_QUERY}ORDER BY block.id DESC LIMIT 1");

        sqlx::query_as::<_, Block>(&query)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "id": "{id}" })]
    async fn get_block_summary(&self, id: u64) -> Result<Option<BlockSummary>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                hash,
                epoch_no::BIGINT AS epoch_no,
                block_no::BIGINT AS block_no,
                slot_no::BIGINT AS slot_no
            FROM block
            WHERE id = $1
        "};

        sqlx::query_as::<_, BlockSummary>(query)
            .bind(id as i64)
            .fetch_optional(&*self.pool)
            .await
    }
}
