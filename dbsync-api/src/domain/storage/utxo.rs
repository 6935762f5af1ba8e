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

use crate::domain::{Page, UtxoAssetRow};
use dbsync_common::domain::TransactionHash;
use std::fmt::Debug;

/// Queries for outputs joined with their assets. Rows of one output are adjacent and ordered by
/// asset ID; a page limits outputs, not rows.
#[trait_variant::make(Send)]
pub trait UtxoStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get the outputs created by the transaction with the given hash, ordered by index.
    async fn get_transaction_output_rows(
        &self,
        hash: TransactionHash,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error>;

    /// Get the outputs consumed by the transaction with the given hash, ordered by input ID.
    async fn get_transaction_input_rows(
        &self,
        hash: TransactionHash,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error>;

    /// Get the outputs created by the transaction with the given ID, ordered by index.
    async fn get_transaction_output_rows_by_id(
        &self,
        tx_id: u64,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error>;

    /// Get a page of the unspent outputs at the given address, keyed by transaction ID and index.
    async fn get_address_utxo_rows(
        &self,
        address: &str,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error>;

    /// Get a page of the unspent outputs of the given stake address, keyed by transaction ID and
    /// index.
    async fn get_stake_utxo_rows(
        &self,
        stake_address: &str,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error>;
}
