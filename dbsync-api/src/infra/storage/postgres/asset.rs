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
        AssetAmountRow, AssetOwner, AssetRow, AssetUnit, Metadata, Page, ReferenceDatum,
        storage::asset::AssetStorage,
    },
    infra::storage::postgres::{
        PostgresStorage, UNSPENT,
        keyset::{push_limit, push_order_by, push_seek},
    },
};
use dbsync_common::domain::{PolicyId, RawAssetName};
use fastrace::trace;
use indoc::{formatdoc, indoc};
use sqlx::QueryBuilder;

/// Transaction metadata label of the CIP-25 NFT metadata standard.
pub const NFT_METADATA_LABEL: u64 = 721;

impl AssetStorage for PostgresStorage {
    #[trace(properties = { "fingerprint": "{fingerprint}" })]
    async fn get_asset_unit_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<AssetUnit>, sqlx::Error> {
        let query = indoc! {"
            SELECT policy AS policy_id, name
            FROM multi_asset
            WHERE fingerprint = $1
        "};

        sqlx::query_as::<_, AssetUnit>(query)
            .bind(fingerprint)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "policy_id": "{policy_id}", "name": "{name}" })]
    async fn get_asset(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                multi_asset.policy AS policy_id,
                multi_asset.name,
                multi_asset.fingerprint,
                SUM(ma_tx_mint.quantity)::TEXT AS quantity,
                COALESCE(SUM(ma_tx_mint.quantity) FILTER (WHERE ma_tx_mint.quantity > 0), 0)::TEXT
                    AS mint_quantity,
                COALESCE(SUM(ma_tx_mint.quantity) FILTER (WHERE ma_tx_mint.quantity < 0), 0)::TEXT
                    AS burn_quantity,
                COUNT(ma_tx_mint.id) AS mint_or_burn_count,
                initial.hash AS initial_mint_tx_hash,
                initial.created_at
            FROM multi_asset
            JOIN ma_tx_mint ON ma_tx_mint.ident = multi_asset.id
            CROSS JOIN LATERAL (
                SELECT tx.hash, EXTRACT(EPOCH FROM block.time)::BIGINT AS created_at
                FROM ma_tx_mint AS first_mint
                JOIN tx ON tx.id = first_mint.tx_id
                JOIN block ON block.id = tx.block_id
                WHERE first_mint.ident = multi_asset.id
                ORDER BY first_mint.tx_id
                LIMIT 1
            ) AS initial
            WHERE multi_asset.policy = $1
            AND multi_asset.name = $2
            GROUP BY multi_asset.id, initial.hash, initial.created_at
        "};

        sqlx::query_as::<_, AssetRow>(query)
            .bind(policy_id)
            .bind(name)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "policy_id": "{policy_id}", "name": "{name}" })]
    async fn get_latest_asset_metadata(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
    ) -> Result<Vec<Metadata>, sqlx::Error> {
        let query = formatdoc! {"
            SELECT
                tx_metadata.key::TEXT AS label,
                COALESCE(tx_metadata.json, 'null'::JSONB) AS json
            FROM tx_metadata
            WHERE tx_metadata.key = {NFT_METADATA_LABEL}
            AND tx_metadata.tx_id = (
                SELECT ma_tx_mint.tx_id
                FROM ma_tx_mint
                JOIN multi_asset ON multi_asset.id = ma_tx_mint.ident
                WHERE multi_asset.policy = $1
                AND multi_asset.name = $2
                AND ma_tx_mint.quantity > 0
                AND EXISTS (
                    SELECT 1
                    FROM tx_metadata
                    WHERE tx_metadata.tx_id = ma_tx_mint.tx_id
                    AND tx_metadata.key = {NFT_METADATA_LABEL}
                )
                ORDER BY ma_tx_mint.tx_id DESC
                LIMIT 1
            )
        "};

        sqlx::query_as::<_, Metadata>(&query)
            .bind(policy_id)
            .bind(name)
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "policy_id": "{policy_id}", "reference_name": "{reference_name}" })]
    async fn get_reference_datums(
        &self,
        policy_id: &PolicyId,
        reference_name: &RawAssetName,
    ) -> Result<Vec<ReferenceDatum>, sqlx::Error> {
        let query = formatdoc! {"
            SELECT
                tx_out.tx_id,
                COALESCE(inline_datum.value, hashed_datum.value) AS value
            FROM multi_asset
            JOIN ma_tx_out ON ma_tx_out.ident = multi_asset.id
            JOIN tx_out ON tx_out.id = ma_tx_out.tx_out_id
            LEFT JOIN datum AS inline_datum ON inline_datum.id = tx_out.inline_datum_id
            LEFT JOIN datum AS hashed_datum ON hashed_datum.hash = tx_out.data_hash
            WHERE multi_asset.policy = $1
            AND multi_asset.name = $2
            AND {UNSPENT}
            ORDER BY tx_out.tx_id DESC, tx_out.index DESC
        "};

        sqlx::query_as::<_, ReferenceDatum>(&query)
            .bind(policy_id)
            .bind(reference_name)
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "policy_id": "{policy_id}", "name": "{name}" })]
    async fn get_asset_owners(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
        page: &Page<(String, i128)>,
    ) -> Result<Vec<AssetOwner>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH owner AS (
                SELECT tx_out.address, SUM(ma_tx_out.quantity) AS quantity
                FROM multi_asset
                JOIN ma_tx_out ON ma_tx_out.ident = multi_asset.id
                JOIN tx_out ON tx_out.id = ma_tx_out.tx_out_id
                WHERE multi_asset.policy =
        "});
        builder
            .push_bind(*policy_id)
            .push(" AND multi_asset.name = ")
            .push_bind(name.clone())
            .push(" AND ")
            .push(UNSPENT)
            .push(indoc! {"
                GROUP BY tx_out.address
            )
            SELECT address, quantity::TEXT AS quantity
            FROM owner
            WHERE TRUE
            "});
        push_seek(&mut builder, &["address", "quantity"], page);
        push_order_by(&mut builder, &["address", "quantity"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_as::<AssetOwner>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "policy_id": "{policy_id}" })]
    async fn get_policy_assets(
        &self,
        policy_id: &PolicyId,
        page: &Page<RawAssetName>,
    ) -> Result<Vec<AssetAmountRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            WITH asset AS (
                SELECT
                    multi_asset.policy AS policy_id,
                    multi_asset.name,
                    COALESCE(SUM(ma_tx_mint.quantity), 0) AS quantity,
                    multi_asset.fingerprint
                FROM multi_asset
                LEFT JOIN ma_tx_mint ON ma_tx_mint.ident = multi_asset.id
                WHERE multi_asset.policy =
        "});
        builder.push_bind(*policy_id).push(indoc! {"

                GROUP BY multi_asset.id
            )
            SELECT policy_id, name, quantity::TEXT AS quantity, fingerprint
            FROM asset
            WHERE TRUE
        "});
        push_seek(&mut builder, &["name"], page);
        push_order_by(&mut builder, &["name"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_as::<AssetAmountRow>()
            .fetch_all(&*self.pool)
            .await
    }
}
