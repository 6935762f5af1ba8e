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
    domain::{Page, UtxoAssetRow, storage::utxo::UtxoStorage},
    infra::storage::postgres::{
        PostgresStorage, UNSPENT,
        keyset::{push_limit, push_order_by, push_seek},
    },
};
use dbsync_common::domain::TransactionHash;
use fastrace::trace;
use indoc::indoc;
use sqlx::{Postgres, QueryBuilder};

/// Outputs in the `page` CTE joined with their datums, scripts and assets. One row per asset,
/// one row with null asset columns for outputs without any.
const UTXO_ASSET_QUERY: &str = indoc! {"
    SELECT
        page.tx_id,
        page.address,
        tx.hash,
        page.index::BIGINT AS index,
        page.value::TEXT AS value,
        page.address_has_script AS has_script,
        page.data_hash AS datum_hash,
        inline_datum.hash AS inline_datum_hash,
        inline_datum.value AS inline_datum_value,
        inline_datum.bytes AS inline_datum_bytes,
        reference_script.hash AS reference_script_hash,
        reference_script.type::TEXT AS reference_script_type,
        payment_script.hash AS script_hash,
        payment_script.type::TEXT AS script_type,
        multi_asset.policy AS policy_id,
        multi_asset.name AS asset_name,
        ma_tx_out.quantity::TEXT AS quantity,
        multi_asset.fingerprint
    FROM page
    JOIN tx ON tx.id = page.tx_id
    LEFT JOIN datum AS inline_datum ON inline_datum.id = page.inline_datum_id
    LEFT JOIN script AS reference_script ON reference_script.id = page.reference_script_id
    LEFT JOIN script AS payment_script
        ON page.address_has_script
        AND payment_script.hash = page.payment_cred
    LEFT JOIN ma_tx_out ON ma_tx_out.tx_out_id = page.id
    LEFT JOIN multi_asset ON multi_asset.id = ma_tx_out.ident
"};

impl UtxoStorage for PostgresStorage {
    #[trace(properties = { "hash": "{hash}" })]
    async fn get_transaction_output_rows(
        &self,
        hash: TransactionHash,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH page AS (
                SELECT tx_out.*
                FROM tx_out
                JOIN tx ON tx.id = tx_out.tx_id
                WHERE tx.hash =
        "});
        builder.push_bind(hash);
        builder.push(")\n");
        builder.push(UTXO_ASSET_QUERY);
        builder.push(" ORDER BY page.index, ma_tx_out.id");

        builder
            .build_query_as::<UtxoAssetRow>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "hash": "{hash}" })]
    async fn get_transaction_input_rows(
        &self,
        hash: TransactionHash,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH page AS (
                SELECT tx_out.*, tx_in.id AS tx_in_id
                FROM tx_in
                JOIN tx ON tx.id = tx_in.tx_in_id
                JOIN tx_out
                    ON tx_out.tx_id = tx_in.tx_out_id
                    AND tx_out.index = tx_in.tx_out_index
                WHERE tx.hash =
        "});
        builder.push_bind(hash);
        builder.push(")\n");
        builder.push(UTXO_ASSET_QUERY);
        builder.push(" ORDER BY page.tx_in_id, ma_tx_out.id");

        builder
            .build_query_as::<UtxoAssetRow>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "tx_id": "{tx_id}" })]
    async fn get_transaction_output_rows_by_id(
        &self,
        tx_id: u64,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH page AS (
                SELECT tx_out.*
                FROM tx_out
                WHERE tx_out.tx_id =
        "});
        builder.push_bind(tx_id as i64);
        builder.push(")\n");
        builder.push(UTXO_ASSET_QUERY);
        builder.push(" ORDER BY page.index, ma_tx_out.id");

        builder
            .build_query_as::<UtxoAssetRow>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "address": "{address}" })]
    async fn get_address_utxo_rows(
        &self,
        address: &str,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH page AS (
                SELECT tx_out.*
                FROM tx_out
                WHERE tx_out.address =
        "});
        builder.push_bind(address.to_owned());
        push_unspent_page(&mut builder, page);

        builder
            .build_query_as::<UtxoAssetRow>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "stake_address": "{stake_address}" })]
    async fn get_stake_utxo_rows(
        &self,
        stake_address: &str,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH page AS (
                SELECT tx_out.*
                FROM tx_out
                JOIN stake_address ON stake_address.id = tx_out.stake_address_id
                WHERE stake_address.view =
        "});
        builder.push_bind(stake_address.to_owned());
        push_unspent_page(&mut builder, page);

        builder
            .build_query_as::<UtxoAssetRow>()
            .fetch_all(&*self.pool)
            .await
    }
}

/// Complete the `page` CTE with the unspent condition and the keyset clauses; the page limits
/// outputs, the rows of each output stay adjacent in the outer order.
fn push_unspent_page(builder: &mut QueryBuilder<'_, Postgres>, page: &Page<(u64, u32)>) {
    builder.push(" AND ").push(UNSPENT);
    push_seek(builder, &["tx_out.tx_id", "tx_out.index"], page);
    push_order_by(builder, &["tx_out.tx_id", "tx_out.index"], page.order);
    push_limit(builder, page);
    builder.push(")\n");

    builder.push(UTXO_ASSET_QUERY);
    push_order_by(builder, &["page.tx_id", "page.index"], page.order);
    builder.push(", ma_tx_out.id");
}
