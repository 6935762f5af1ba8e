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

mod bytes;
mod pub_sub;

pub use bytes::*;
pub use pub_sub::*;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub type BlockHash = ByteArray<32>;
pub type TransactionHash = ByteArray<32>;
pub type DatumHash = ByteArray<32>;
pub type PolicyId = ByteArray<28>;
pub type ScriptHash = ByteArray<28>;
pub type PoolHash = ByteArray<28>;
pub type RawAssetName = ByteVec;
pub type RawDatum = ByteVec;

/// Sort direction of a list query.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    #[display("asc")]
    Asc,

    #[display("desc")]
    Desc,
}

impl Order {
    /// The SQL keyword for this direction.
    pub fn sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = UnknownOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(UnknownOrderError(s.to_owned())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown order {0}, expected asc or desc")]
pub struct UnknownOrderError(String);

#[cfg(test)]
mod tests {
    use crate::domain::Order;
    use assert_matches::assert_matches;

    #[test]
    fn test_order_from_str() {
        assert_matches!("asc".parse::<Order>(), Ok(Order::Asc));
        assert_matches!("DESC".parse::<Order>(), Ok(Order::Desc));
        assert_matches!("descending".parse::<Order>(), Ok(Order::Desc));
        assert!("sideways".parse::<Order>().is_err());
    }

    #[test]
    fn test_order_deserialize() {
        let order = serde_json::from_str::<Order>("\"desc\"");
        assert_matches!(order, Ok(Order::Desc));
        assert_eq!(Order::Desc.sql(), "DESC");
        assert_eq!(Order::default(), Order::Asc);
    }
}
