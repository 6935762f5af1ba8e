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

use crate::domain::{AssetName, is_printable};
use dbsync_common::{
    domain::{ByteVec, PolicyId},
    error::StdErrorExt,
    infra::sqlx::NumericText,
};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value, json};
use sqlx::FromRow;
use thiserror::Error;

/// Metadata attached to an asset or a transaction, keyed by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Metadata {
    #[sqlx(try_from = "NumericText")]
    pub label: u64,

    pub json: Value,
}

/// Plutus data in the detailed JSON schema as stored for datums by db-sync, e.g.
/// `{"constructor": 0, "fields": [{"int": 1}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlutusData {
    Constructor {
        constructor: u64,
        fields: Vec<PlutusData>,
    },
    Map {
        map: Vec<PlutusPair>,
    },
    List {
        list: Vec<PlutusData>,
    },
    Int {
        int: Number,
    },
    Bytes {
        bytes: ByteVec,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlutusPair {
    pub k: PlutusData,
    pub v: PlutusData,
}

impl PlutusData {
    /// Convert into plain JSON: maps become objects, printable UTF-8 bytes become strings and
    /// other bytes become "0x"-prefixed hex; constructors keep their index and fields.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Constructor {
                constructor,
                fields,
            } => json!({
                "constructor": constructor,
                "fields": fields.iter().map(Self::to_json).collect::<Vec<_>>(),
            }),

            Self::Map { map } => {
                let object = map
                    .iter()
                    .map(|PlutusPair { k, v }| (k.to_key(), v.to_json()))
                    .collect::<Map<_, _>>();
                Value::Object(object)
            }

            Self::List { list } => Value::Array(list.iter().map(Self::to_json).collect()),

            Self::Int { int } => Value::Number(int.clone()),

            Self::Bytes { bytes } => Value::String(bytes_to_text(bytes)),
        }
    }

    fn to_key(&self) -> String {
        match self {
            Self::Bytes { bytes } => bytes_to_text(bytes),
            Self::Int { int } => int.to_string(),
            other => other.to_json().to_string(),
        }
    }
}

fn bytes_to_text(bytes: &ByteVec) -> String {
    match std::str::from_utf8(bytes.as_ref()) {
        Ok(text) if is_printable(text) => text.to_owned(),
        _ => format!("0x{bytes}"),
    }
}

/// Build CIP-68 metadata for the given user token from the datum of its reference token:
/// `{policyId: {assetName: metadata}, version}`, labeled with the user token's label. The datum
/// is expected to be a constructor with the metadata map and the version as first two fields.
///
/// Never fails: if the datum does not have the expected shape, the raw fields are used if any,
/// else an empty object.
pub fn datum_to_metadata(policy_id: &PolicyId, user_token_name: &[u8], datum: &Value) -> Metadata {
    let AssetName { name, label } = AssetName::decode(user_token_name);
    let label = label.map(|label| label.value() as u64).unwrap_or_default();

    let json = match cip68_metadata(datum) {
        Ok((metadata, version)) => json!({
            policy_id.to_string(): { name: metadata },
            "version": version,
        }),

        Err(error) => {
            warn!(
                policy_id:%,
                asset_name:% = name,
                error:% = error.as_chain();
                "resolution degraded, using raw datum fields"
            );

            datum
                .get("fields")
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()))
        }
    };

    Metadata { label, json }
}

fn cip68_metadata(datum: &Value) -> Result<(Value, Value), DatumError> {
    let datum = PlutusData::deserialize(datum)?;

    match datum {
        PlutusData::Constructor { fields, .. } if fields.len() >= 2 => {
            Ok((fields[0].to_json(), fields[1].to_json()))
        }
        _ => Err(DatumError::Shape),
    }
}

#[derive(Debug, Error)]
pub enum DatumError {
    #[error("cannot decode datum as Plutus data")]
    Decode(#[from] serde_json::Error),

    #[error("datum is not a constructor with metadata and version")]
    Shape,
}
