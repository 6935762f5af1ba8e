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

use dbsync_common::{
    domain::ByteVec,
    infra::sqlx::{NumericText, SqlxOption},
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Epoch {
    #[sqlx(try_from = "i64")]
    pub no: u64,

    #[sqlx(try_from = "NumericText")]
    pub out_sum: i128,

    #[sqlx(try_from = "NumericText")]
    pub fees: u64,

    #[sqlx(try_from = "i64")]
    pub tx_count: u64,

    #[sqlx(try_from = "i64")]
    pub blk_count: u64,

    /// Seconds since the Unix epoch.
    #[sqlx(try_from = "i64")]
    pub start_time: u64,

    /// Seconds since the Unix epoch.
    #[sqlx(try_from = "i64")]
    pub end_time: u64,
}

/// Protocol parameters in effect for an epoch. Parameters introduced by later eras are absent
/// for earlier epochs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EpochParameters {
    #[sqlx(try_from = "i64")]
    pub epoch_no: u64,

    #[sqlx(try_from = "i64")]
    pub min_fee_a: u64,

    #[sqlx(try_from = "i64")]
    pub min_fee_b: u64,

    #[sqlx(try_from = "i64")]
    pub max_block_size: u64,

    #[sqlx(try_from = "i64")]
    pub max_tx_size: u64,

    #[sqlx(try_from = "i64")]
    pub max_block_header_size: u64,

    #[sqlx(try_from = "NumericText")]
    pub key_deposit: u64,

    #[sqlx(try_from = "NumericText")]
    pub pool_deposit: u64,

    #[sqlx(try_from = "i64")]
    pub max_epoch: u64,

    #[sqlx(try_from = "i64")]
    pub optimal_pool_count: u64,

    pub influence_a0: f64,

    pub monetary_expand_rate_rho: f64,

    pub treasury_growth_rate_tau: f64,

    pub decentralisation: f64,

    #[sqlx(try_from = "i64")]
    pub protocol_major: u64,

    #[sqlx(try_from = "i64")]
    pub protocol_minor: u64,

    #[sqlx(try_from = "NumericText")]
    pub min_utxo: u64,

    #[sqlx(try_from = "NumericText")]
    pub min_pool_cost: u64,

    pub nonce: Option<ByteVec>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub coins_per_utxo_size: Option<u64>,

    pub price_mem: Option<f64>,

    pub price_step: Option<f64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub max_tx_ex_mem: Option<u64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub max_tx_ex_steps: Option<u64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub max_block_ex_mem: Option<u64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub max_block_ex_steps: Option<u64>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub max_val_size: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub collateral_percent: Option<u64>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub max_collateral_inputs: Option<u64>,

    #[sqlx(try_from = "i64")]
    pub block_id: u64,
}
