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

use crate::domain::{AssetAmount, AssetName, Cip68Label, Keyed, Metadata};
use dbsync_common::{
    domain::{PolicyId, RawAssetName, TransactionHash},
    infra::sqlx::NumericText,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Policy ID and raw asset name of an asset class.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AssetUnit {
    pub policy_id: PolicyId,
    pub name: RawAssetName,
}

/// Mint and burn aggregates of an asset class.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AssetRow {
    pub policy_id: PolicyId,

    pub name: RawAssetName,

    pub fingerprint: String,

    #[sqlx(try_from = "NumericText")]
    pub quantity: i128,

    #[sqlx(try_from = "NumericText")]
    pub mint_quantity: i128,

    #[sqlx(try_from = "NumericText")]
    pub burn_quantity: i128,

    #[sqlx(try_from = "i64")]
    pub mint_or_burn_count: u64,

    pub initial_mint_tx_hash: TransactionHash,

    /// Seconds since the Unix epoch of the block of the first mint.
    #[sqlx(try_from = "i64")]
    pub created_at: u64,
}

/// An asset class with its net quantity, resolved name and effective metadata.
///
/// The net quantity is the sum of the mint quantity and the (negative) burn quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub policy_id: PolicyId,
    pub raw_asset_name: RawAssetName,
    pub asset_name: String,
    pub asset_name_label: Option<Cip68Label>,
    pub fingerprint: String,
    pub quantity: i128,
    pub mint_quantity: i128,
    pub burn_quantity: i128,
    pub mint_or_burn_count: u64,
    pub initial_mint_tx_hash: TransactionHash,
    pub created_at: u64,
    pub metadata: Vec<Metadata>,
}

impl Asset {
    pub fn new(row: AssetRow, metadata: Vec<Metadata>) -> Self {
        let AssetRow {
            policy_id,
            name,
            fingerprint,
            quantity,
            mint_quantity,
            burn_quantity,
            mint_or_burn_count,
            initial_mint_tx_hash,
            created_at,
        } = row;
        let AssetName {
            name: asset_name,
            label,
        } = AssetName::decode(name.as_ref());

        Self {
            policy_id,
            raw_asset_name: name,
            asset_name,
            asset_name_label: label,
            fingerprint,
            quantity,
            mint_quantity,
            burn_quantity,
            mint_or_burn_count,
            initial_mint_tx_hash,
            created_at,
            metadata,
        }
    }
}

/// A quantity of an asset class, e.g. summed up over the outputs of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AssetAmountRow {
    pub policy_id: PolicyId,

    pub name: RawAssetName,

    #[sqlx(try_from = "NumericText")]
    pub quantity: i128,

    pub fingerprint: Option<String>,
}

impl From<AssetAmountRow> for AssetAmount {
    fn from(row: AssetAmountRow) -> Self {
        AssetAmount::new(row.policy_id, row.name, row.quantity, row.fingerprint)
    }
}

/// An address holding some quantity of an asset class in unspent outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AssetOwner {
    pub address: String,

    #[sqlx(try_from = "NumericText")]
    pub quantity: i128,
}

impl Keyed for AssetOwner {
    type Key = (String, i128);

    fn key(&self) -> Self::Key {
        (self.address.clone(), self.quantity)
    }
}

/// The inline datum of an unspent output holding a reference token.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReferenceDatum {
    #[sqlx(try_from = "i64")]
    pub tx_id: u64,

    pub value: Option<Value>,
}
