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

use crate::domain::{
    AddressTransaction, AssetAmountRow, Metadata, Page, Transaction, TransactionCounts,
};
use dbsync_common::domain::TransactionHash;
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait TransactionStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get a [Transaction] for the given ID.
    async fn get_transaction_by_id(&self, id: u64) -> Result<Option<Transaction>, sqlx::Error>;

    /// Get a [Transaction] for the given hash.
    async fn get_transaction_by_hash(
        &self,
        hash: TransactionHash,
    ) -> Result<Option<Transaction>, sqlx::Error>;

    /// Get the [TransactionCounts] for the transaction with the given ID.
    async fn get_transaction_counts(&self, id: u64) -> Result<TransactionCounts, sqlx::Error>;

    /// Get the asset quantities summed up over the outputs of the transaction with the given ID.
    async fn get_transaction_assets(&self, id: u64) -> Result<Vec<AssetAmountRow>, sqlx::Error>;

    /// Get a page of the [Transaction]s of the block with the given block number, keyed by ID.
    async fn get_block_transactions(
        &self,
        block_no: u64,
        page: &Page<u64>,
    ) -> Result<Vec<Transaction>, sqlx::Error>;

    /// Get all [Transaction]s of the block with the given ID, ordered by ID.
    async fn get_transactions_by_block_id(
        &self,
        block_id: u64,
    ) -> Result<Vec<Transaction>, sqlx::Error>;

    /// Get the [Metadata] of the transaction with the given hash, ordered by label.
    async fn get_transaction_metadata(
        &self,
        hash: TransactionHash,
    ) -> Result<Vec<Metadata>, sqlx::Error>;

    /// Get a page of the transactions with an input or an output at the given address, keyed by
    /// ID.
    async fn get_address_transactions(
        &self,
        address: &str,
        page: &Page<u64>,
    ) -> Result<Vec<AddressTransaction>, sqlx::Error>;
}
