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

use crate::domain::Keyed;
use dbsync_common::{
    domain::{BlockHash, ByteVec},
    infra::sqlx::{NumericText, SqlxOption},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A block with its neighbors, the sums over its transactions and its confirmations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Block {
    #[sqlx(try_from = "i64")]
    pub id: u64,

    pub hash: BlockHash,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub epoch_no: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub slot_no: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub epoch_slot_no: Option<u64>,

    /// Absent for epoch boundary blocks.
    #[sqlx(try_from = "SqlxOption<i64>")]
    pub block_no: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub previous_block: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub next_block: Option<u64>,

    pub slot_leader: String,

    #[sqlx(try_from = "i64")]
    pub size: u32,

    /// Seconds since the Unix epoch.
    #[sqlx(try_from = "i64")]
    pub time: u64,

    #[sqlx(try_from = "i64")]
    pub tx_count: u64,

    #[sqlx(try_from = "NumericText")]
    pub out_sum: u64,

    #[sqlx(try_from = "NumericText")]
    pub fees: u64,

    #[sqlx(try_from = "i64")]
    pub confirmations: u64,

    pub op_cert: Option<ByteVec>,

    pub vrf_key: Option<String>,
}

impl Keyed for Block {
    type Key = u64;

    fn key(&self) -> Self::Key {
        self.id
    }
}

/// The block of a transaction in short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BlockSummary {
    pub hash: BlockHash,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub epoch_no: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub block_no: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub slot_no: Option<u64>,
}
