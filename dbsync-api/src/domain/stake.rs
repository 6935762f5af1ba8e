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

use dbsync_common::infra::sqlx::{NumericText, SqlxOption};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stake controlled by a stake address, with its reward balance and delegation.
///
/// The controlled stake is the value of the unspent outputs plus the withdrawable rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Stake {
    pub active: bool,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub active_epoch: Option<u64>,

    #[sqlx(try_from = "NumericText")]
    pub controlled_total_stake: i128,

    #[sqlx(try_from = "NumericText")]
    pub rewards_sum: i128,

    #[sqlx(try_from = "NumericText")]
    pub withdrawals_sum: i128,

    #[sqlx(try_from = "NumericText")]
    pub reserves_sum: i128,

    #[sqlx(try_from = "NumericText")]
    pub treasury_sum: i128,

    #[sqlx(try_from = "NumericText")]
    pub withdraw_available: i128,

    /// Bech32 ID of the pool delegated to most recently.
    pub pool_id: Option<String>,
}
