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
    domain::{Datum, Page, RedeemerRow, Script, storage::script::ScriptStorage},
    infra::storage::postgres::{
        PostgresStorage,
        keyset::{push_limit, push_order_by, push_seek},
    },
};
use dbsync_common::domain::{DatumHash, ScriptHash};
use fastrace::trace;
use indoc::indoc;
use sqlx::QueryBuilder;

impl ScriptStorage for PostgresStorage {
    #[trace(properties = { "hash": "{hash}" })]
    async fn get_script(&self, hash: ScriptHash) -> Result<Option<Script>, sqlx::Error> {
        let query = indoc! {"
            SELECT
                tx_id,
                hash,
                type::TEXT AS type,
                json,
                bytes AS code,
                serialised_size::BIGINT AS serialised_size
            FROM script
            WHERE hash = $1
        "};

        sqlx::query_as::<_, Script>(query)
            .bind(hash)
            .fetch_optional(&*self.pool)
            .await
    }

    #[trace(properties = { "hash": "{hash}" })]
    async fn get_script_redeemers(
        &self,
        hash: ScriptHash,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<RedeemerRow>, sqlx::Error> {
        let mut builder = QueryBuilder::new(indoc! {"
            SELECT
                redeemer.tx_id,
                tx.hash AS tx_hash,
                redeemer.index::BIGINT AS index,
                redeemer.purpose::TEXT AS purpose,
                redeemer.unit_mem::BIGINT AS unit_mem,
                redeemer.unit_steps::BIGINT AS unit_steps,
                redeemer.fee::TEXT AS fee,
                redeemer.script_hash,
                redeemer_data.hash AS datum_hash,
                redeemer_data.value AS datum_value,
                redeemer_data.bytes AS datum_bytes
            FROM redeemer
            JOIN tx ON tx.id = redeemer.tx_id
            JOIN redeemer_data ON redeemer_data.id = redeemer.redeemer_data_id
            WHERE redeemer.script_hash =
        "});
        builder.push_bind(hash);
        push_seek(&mut builder, &["redeemer.tx_id", "redeemer.index"], page);
        push_order_by(&mut builder, &["redeemer.tx_id", "redeemer.index"], page.order);
        push_limit(&mut builder, page);

        builder
            .build_query_as::<RedeemerRow>()
            .fetch_all(&*self.pool)
            .await
    }

    #[trace(properties = { "hash": "{hash}" })]
    async fn get_datum(&self, hash: DatumHash) -> Result<Option<Datum>, sqlx::Error> {
        let query = indoc! {"
            SELECT hash, value, bytes
            FROM datum
            WHERE hash = $1
        "};

        sqlx::query_as::<_, Datum>(query)
            .bind(hash)
            .fetch_optional(&*self.pool)
            .await
    }
}
