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
    domain::{
        AddressTransaction, AssetAmountRow, Metadata, Page, Transaction, TransactionCounts,
        storage::transaction::TransactionStorage,
    },
    infra::storage::postgres::{
        PostgresStorage,
        keyset::{push_limit, push_order_by, push_seek},
    },
};
use dbsync_common::domain::TransactionHash;
use fastrace::trace;
use indoc::indoc;
use sqlx::QueryBuilder;

const TRANSACTION_QUERY: &str = indoc! {"
    SELECT
        tx.id,
        tx.hash,
        tx.block_id,
        tx.block_index::BIGINT AS block_index,
        tx.out_sum::TEXT AS out_sum,
        tx.fee::TEXT AS fee,
        tx.deposit::TEXT AS deposit,
        tx.size::BIGINT AS size,
        tx.invalid_before::TEXT AS invalid_before,
        tx.invalid_hereafter::TEXT AS invalid_hereafter,
        tx.valid_contract,
        tx.script_size::BIGINT AS script_size
    FROM tx
"};

impl TransactionStorage for PostgresStorage {
    #[trace(properties = { "id": "{id}" })]
    async fn get_transaction_by_id(&self, id: u64) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("{TRANSACTION_QUERY}WHERE tx.id = $1");

        sqlx::query_as::<_, Transaction>(&query)
            .bind(id as i64)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "hash": "{hash}" })]
    async fn get_transaction_by_hash(
        &self,
        hash: TransactionHash,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("{TRANSACTION_QUERY}WHERE tx.hash = $1");

        sqlx::query_as::<_, Transaction>(&query)
            .bind(hash)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "id": "{id}" })]
    async fn get_transaction_counts(&self, id: u64) -> Result<TransactionCounts, sqlx::Error> {
        let query = indoc! {"
            SELECT
                (SELECT COUNT(*) FROM tx_out WHERE tx_id = $1)
                    + (SELECT COUNT(*) FROM tx_in WHERE tx_in_id = $1) AS utxo_count,
                (SELECT COUNT(*) FROM withdrawal WHERE tx_id = $1) AS withdrawal_count,
                (SELECT COUNT(*) FROM delegation WHERE tx_id = $1) AS delegation_count,
                (SELECT COUNT(*) FROM stake_registration WHERE tx_id = $1)
                    + (SELECT COUNT(*) FROM stake_deregistration WHERE tx_id = $1)
                    AS stake_cert_count,
                EXISTS (SELECT 1 FROM pool_update WHERE registered_tx_id = $1) AS pool_update,
                EXISTS (SELECT 1 FROM pool_retire WHERE announced_tx_id = $1) AS pool_retire,
                (SELECT COUNT(*) FROM ma_tx_mint WHERE tx_id = $1) AS asset_mint_or_burn_count
        "};

        sqlx::query_as::<_, TransactionCounts>(query)
            .bind(id as i64)
            .fetch_one(&*self.pool)
            .await
    }

    #[trace(properties = { "id": "{id}" })]
    async fn get_transaction_assets(&self, id: u64) -> Result<Vec<AssetAmountRow>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                multi_asset.policy AS policy_id,
                multi_asset.name,
                SUM(ma_tx_out.quantity)::TEXT AS quantity,
                multi_asset.fingerprint
            FROM ma_tx_out
            JOIN tx_out ON tx_out.id = ma_tx_out.tx_out_id
            JOIN multi_asset ON multi_asset.id = ma_tx_out.ident
            WHERE tx_out.tx_id = $1
            GROUP BY multi_asset.id
            ORDER BY multi_asset.policy, multi_asset.name
        "};

        sqlx::query_as::<_, AssetAmountRow>(query)
            .bind(id as i64)
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "block_no": "{block_no}" })]
    async fn get_block_transactions(
        &self,
        block_no: u64,
        page: &Page<u64>,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let mut builder = QueryBuilder::new(TRANSACTION_QUERY);
        builder
            .push("JOIN block ON block.id = tx.block_id WHERE block.block_no = ")
            .push_bind(block_no as i64);
        push_seek(&mut builder, &["tx.id"], page);
        push_order_by(&mut builder, &["tx.id"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_as::<Transaction>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "block_id": "{block_id}" })]
    async fn get_transactions_by_block_id(
        &self,
        block_id: u64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!("{TRANSACTION_QUERY}WHERE tx.block_id = $1 ORDER BY tx.id");

        sqlx::query_as::<_, Transaction>(&query)
            .bind(block_id as i64)
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "hash": "{hash}" })]
    async fn get_transaction_metadata(
        &self,
        hash: TransactionHash,
    ) -> Result<Vec<Metadata>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                tx_metadata.key::TEXT AS label,
                COALESCE(tx_metadata.json, 'null'::JSONB) AS json
            FROM tx_metadata
            JOIN tx ON tx.id = tx_metadata.tx_id
            WHERE tx.hash = $1
            ORDER BY tx_metadata.key
        "};

        sqlx::query_as::<_, Metadata>(query)
            .bind(hash)
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "address": "{address}" })]
    async fn get_address_transactions(
        &self,
        address: &str,
        page: &Page<u64>,
    ) -> Result<Vec<AddressTransaction>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH address_tx AS (
                SELECT tx_out.tx_id
                FROM tx_out
                WHERE tx_out.address =
        "});
        builder.push_bind(address.to_owned());
        builder.push(indoc! {"

                UNION
                SELECT tx_in.tx_in_id
                FROM tx_out
                JOIN tx_in
                    ON tx_in.tx_out_id = tx_out.tx_id
                    AND tx_in.tx_out_index = tx_out.index
                WHERE tx_out.address =
        "});
        builder.push_bind(address.to_owned());
        builder.push(indoc! {"
            )
            SELECT
                tx.id AS tx_id,
                tx.hash,
                tx.block_index::BIGINT AS block_index,
                block.block_no::BIGINT AS block_no
            FROM address_tx
            JOIN tx ON tx.id = address_tx.tx_id
            JOIN block ON block.id = tx.block_id
            WHERE TRUE
        "});
        push_seek(&mut builder, &["tx.id"], page);
        push_order_by(&mut builder, &["tx.id"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_as::<AddressTransaction>()
            .fetch_all(&*self.pool)
            .await
    }
}
