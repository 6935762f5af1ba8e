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

use crate::domain::{AssetAmount, BlockSummary, Keyed, Utxo};
use dbsync_common::{
    domain::TransactionHash,
    infra::sqlx::{NumericText, SqlxOption},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A transaction; the block and the details are only set for deep reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    #[sqlx(try_from = "i64")]
    pub id: u64,

    pub hash: TransactionHash,

    #[sqlx(try_from = "i64")]
    pub block_id: u64,

    #[sqlx(try_from = "i64")]
    pub block_index: u32,

    #[sqlx(try_from = "NumericText")]
    pub out_sum: u64,

    #[sqlx(try_from = "NumericText")]
    pub fee: u64,

    /// Negative for deposit refunds.
    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub deposit: Option<i128>,

    #[sqlx(try_from = "i64")]
    pub size: u32,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub invalid_before: Option<u64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub invalid_hereafter: Option<u64>,

    pub valid_contract: bool,

    #[sqlx(try_from = "i64")]
    pub script_size: u32,

    #[sqlx(skip)]
    pub block: Option<BlockSummary>,

    #[sqlx(skip)]
    pub details: Option<TransactionDetails>,
}

impl Keyed for Transaction {
    type Key = u64;

    fn key(&self) -> Self::Key {
        self.id
    }
}

/// Derived data of a transaction, omitted by shallow reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub counts: TransactionCounts,

    /// Asset quantities summed up over the outputs.
    pub assets: Vec<AssetAmount>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TransactionCounts {
    #[sqlx(try_from = "i64")]
    pub utxo_count: u64,

    #[sqlx(try_from = "i64")]
    pub withdrawal_count: u64,

    #[sqlx(try_from = "i64")]
    pub delegation_count: u64,

    #[sqlx(try_from = "i64")]
    pub stake_cert_count: u64,

    pub pool_update: bool,

    pub pool_retire: bool,

    #[sqlx(try_from = "i64")]
    pub asset_mint_or_burn_count: u64,
}

/// A transaction in which an address has an input or an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AddressTransaction {
    #[sqlx(try_from = "i64")]
    pub tx_id: u64,

    pub hash: TransactionHash,

    #[sqlx(try_from = "i64")]
    pub block_index: u32,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub block_no: Option<u64>,
}

impl Keyed for AddressTransaction {
    type Key = u64;

    fn key(&self) -> Self::Key {
        self.tx_id
    }
}

/// The outputs consumed and created by a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionUtxos {
    pub hash: TransactionHash,
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<Utxo>,
}
