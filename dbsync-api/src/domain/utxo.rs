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

use crate::domain::{AssetName, Cip68Label, Datum, Keyed, ScriptRef};
use dbsync_common::{
    domain::{DatumHash, PolicyId, RawAssetName, RawDatum, ScriptHash, TransactionHash},
    infra::sqlx::{NumericText, SqlxOption},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::{HashMap, hash_map::Entry};

/// A transaction output with its multi-asset bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_id: u64,
    pub address: String,
    pub hash: TransactionHash,
    pub index: u32,
    pub value: u64,
    pub has_script: bool,
    pub datum_hash: Option<DatumHash>,
    pub inline_datum: Option<Datum>,
    pub reference_script: Option<ScriptRef>,

    /// The script locking this output, if its payment credential is a script.
    pub script: Option<ScriptRef>,

    pub assets: Vec<AssetAmount>,
}

impl Keyed for Utxo {
    type Key = (u64, u32);

    fn key(&self) -> Self::Key {
        (self.tx_id, self.index)
    }
}

/// A quantity of a native asset with its resolved name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub policy_id: PolicyId,
    pub raw_asset_name: RawAssetName,
    pub asset_name: String,
    pub asset_name_label: Option<Cip68Label>,

    /// Negative only for burns.
    pub quantity: i128,

    pub fingerprint: Option<String>,
}

impl AssetAmount {
    pub fn new(
        policy_id: PolicyId,
        raw_asset_name: RawAssetName,
        quantity: i128,
        fingerprint: Option<String>,
    ) -> Self {
        let AssetName { name, label } = AssetName::decode(raw_asset_name.as_ref());

        Self {
            policy_id,
            raw_asset_name,
            asset_name: name,
            asset_name_label: label,
            quantity,
            fingerprint,
        }
    }
}

/// Assets of a policy are sorted by name.
impl Keyed for AssetAmount {
    type Key = RawAssetName;

    fn key(&self) -> Self::Key {
        self.raw_asset_name.clone()
    }
}

/// One row of the join of outputs with their assets: output columns are repeated for each asset;
/// the asset columns are null for outputs without assets.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UtxoAssetRow {
    #[sqlx(try_from = "i64")]
    pub tx_id: u64,

    pub address: String,

    pub hash: TransactionHash,

    #[sqlx(try_from = "i64")]
    pub index: u32,

    #[sqlx(try_from = "NumericText")]
    pub value: u64,

    pub has_script: bool,

    pub datum_hash: Option<DatumHash>,
    pub inline_datum_hash: Option<DatumHash>,
    pub inline_datum_value: Option<Value>,
    pub inline_datum_bytes: Option<RawDatum>,

    pub reference_script_hash: Option<ScriptHash>,
    pub reference_script_type: Option<String>,

    pub script_hash: Option<ScriptHash>,
    pub script_type: Option<String>,

    pub policy_id: Option<PolicyId>,
    pub asset_name: Option<RawAssetName>,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub quantity: Option<i128>,

    pub fingerprint: Option<String>,
}

impl UtxoAssetRow {
    fn utxo(&self) -> Utxo {
        let inline_datum = self
            .inline_datum_hash
            .zip(self.inline_datum_bytes.as_ref())
            .map(|(hash, bytes)| Datum {
                hash,
                value: self.inline_datum_value.clone(),
                bytes: bytes.to_owned(),
            });

        Utxo {
            tx_id: self.tx_id,
            address: self.address.clone(),
            hash: self.hash,
            index: self.index,
            value: self.value,
            has_script: self.has_script,
            datum_hash: self.datum_hash,
            inline_datum,
            reference_script: script_ref(self.reference_script_hash, &self.reference_script_type),
            script: script_ref(self.script_hash, &self.script_type),
            assets: vec![],
        }
    }

    fn asset(&self) -> Option<AssetAmount> {
        let policy_id = self.policy_id?;

        Some(AssetAmount::new(
            policy_id,
            self.asset_name.clone().unwrap_or_default(),
            self.quantity.unwrap_or_default(),
            self.fingerprint.clone(),
        ))
    }
}

fn script_ref(hash: Option<ScriptHash>, kind: &Option<String>) -> Option<ScriptRef> {
    hash.map(|hash| ScriptRef {
        hash,
        kind: kind.clone().unwrap_or_default(),
    })
}

/// Fold output × asset rows into one [Utxo] per distinct (address, hash, index), in order of
/// first appearance. Output columns are taken from the first row of each output, every row with a
/// policy ID adds one asset.
pub fn group_utxo_assets<I>(rows: I) -> Vec<Utxo>
where
    I: IntoIterator,
    I::Item: AsRef<UtxoAssetRow>,
{
    let mut utxos = Vec::<Utxo>::new();
    let mut positions = HashMap::<(String, TransactionHash, u32), usize>::new();

    for row in rows {
        let row = row.as_ref();

        let position = match positions.entry((row.address.clone(), row.hash, row.index)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                utxos.push(row.utxo());
                *entry.insert(utxos.len() - 1)
            }
        };

        if let Some(asset) = row.asset() {
            utxos[position].assets.push(asset);
        }
    }

    utxos
}

impl AsRef<UtxoAssetRow> for UtxoAssetRow {
    fn as_ref(&self) -> &UtxoAssetRow {
        self
    }
}
