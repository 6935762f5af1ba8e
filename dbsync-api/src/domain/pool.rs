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
    domain::{ByteVec, PoolHash},
    infra::sqlx::{NumericText, SqlxOption},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stake pool with its metadata reference and latest registration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Pool {
    /// Bech32 view.
    pub pool_id: String,

    pub raw_id: PoolHash,

    pub url: Option<String>,

    pub hash: Option<ByteVec>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub pledge: Option<u64>,

    pub margin: Option<f64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub fixed_cost: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub active_epoch_no: Option<u64>,
}

/// A current delegator of a pool: its latest delegation is to this pool and it has not
/// deregistered since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PoolDelegation {
    #[sqlx(try_from = "i64")]
    pub stake_address_id: u64,

    pub stake_address: String,

    #[sqlx(try_from = "NumericText")]
    pub stake: i128,
}

impl Keyed for PoolDelegation {
    type Key = u64;

    fn key(&self) -> Self::Key {
        self.stake_address_id
    }
}
