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
    domain::{ByteVec, DatumHash, RawDatum, ScriptHash, TransactionHash},
    infra::sqlx::{NumericText, SqlxOption},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A datum with its structured value in the detailed JSON schema and its raw CBOR bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Datum {
    pub hash: DatumHash,
    pub value: Option<Value>,
    pub bytes: RawDatum,
}

/// A script referenced by hash and type, e.g. from an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRef {
    pub hash: ScriptHash,

    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Script {
    #[sqlx(try_from = "i64")]
    pub tx_id: u64,

    pub hash: ScriptHash,

    /// E.g. "timelock", "plutusV2".
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,

    /// Only for native scripts.
    pub json: Option<Value>,

    /// Only for Plutus scripts.
    pub code: Option<ByteVec>,

    #[sqlx(try_from = "SqlxOption<i64>")]
    pub serialised_size: Option<u64>,
}

/// A redeemer row with its datum columns flattened.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RedeemerRow {
    #[sqlx(try_from = "i64")]
    pub tx_id: u64,

    pub tx_hash: TransactionHash,

    #[sqlx(try_from = "i64")]
    pub index: u32,

    pub purpose: String,

    #[sqlx(try_from = "i64")]
    pub unit_mem: u64,

    #[sqlx(try_from = "i64")]
    pub unit_steps: u64,

    #[sqlx(try_from = "SqlxOption<NumericText>")]
    pub fee: Option<u64>,

    pub script_hash: Option<ScriptHash>,

    pub datum_hash: DatumHash,
    pub datum_value: Option<Value>,
    pub datum_bytes: RawDatum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redeemer {
    pub tx_id: u64,
    pub tx_hash: TransactionHash,
    pub index: u32,
    pub purpose: String,
    pub unit_mem: u64,
    pub unit_steps: u64,
    pub fee: Option<u64>,
    pub script_hash: Option<ScriptHash>,
    pub datum: Datum,
}

impl From<RedeemerRow> for Redeemer {
    fn from(row: RedeemerRow) -> Self {
        let RedeemerRow {
            tx_id,
            tx_hash,
            index,
            purpose,
            unit_mem,
            unit_steps,
            fee,
            script_hash,
            datum_hash,
            datum_value,
            datum_bytes,
        } = row;

        Self {
            tx_id,
            tx_hash,
            index,
            purpose,
            unit_mem,
            unit_steps,
            fee,
            script_hash,
            datum: Datum {
                hash: datum_hash,
                value: datum_value,
                bytes: datum_bytes,
            },
        }
    }
}

impl Keyed for Redeemer {
    type Key = (u64, u32);

    fn key(&self) -> Self::Key {
        (self.tx_id, self.index)
    }
}
