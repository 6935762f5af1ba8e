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

//! Ledger events, decoded from the records carried by change notifications.

use crate::domain::{Notification, Utxo};
use dbsync_common::{
    domain::{BlockHash, TransactionHash},
    message,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NEW_EPOCH: &str = "new_epoch";
pub const NEW_BLOCK: &str = "new_block";
pub const NEW_DELEGATION: &str = "new_delegation";
pub const NEW_TRANSACTION: &str = "new_transaction";

/// The channels on which ledger events are notified.
pub const LEDGER_CHANNELS: [&str; 4] = [NEW_EPOCH, NEW_BLOCK, NEW_DELEGATION, NEW_TRANSACTION];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochAdded {
    pub id: u64,
    pub no: u64,
    pub tx_count: u64,
    pub blk_count: u64,
    pub start_time: String,
    pub end_time: String,
}

message!(EpochAdded);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAdded {
    pub id: u64,

    #[serde(with = "bytea")]
    pub hash: BlockHash,

    pub epoch_no: Option<u64>,
    pub slot_no: Option<u64>,
    pub epoch_slot_no: Option<u64>,
    pub block_no: Option<u64>,
    pub previous_id: Option<u64>,
    pub slot_leader_id: u64,
    pub size: u64,
    pub time: String,
    pub tx_count: u64,
}

message!(BlockAdded);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationAdded {
    pub id: u64,
    pub addr_id: u64,
    pub cert_index: i64,
    pub pool_hash_id: u64,
    pub active_epoch_no: u64,
    pub tx_id: u64,
    pub slot_no: u64,
    pub redeemer_id: Option<u64>,
}

message!(DelegationAdded);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAdded {
    pub id: u64,

    #[serde(with = "bytea")]
    pub hash: TransactionHash,

    pub block_id: u64,
    pub block_index: u64,
    pub out_sum: u64,
    pub fee: u64,
    pub deposit: Option<i64>,
    pub size: u64,
    pub invalid_before: Option<u64>,
    pub invalid_hereafter: Option<u64>,
    pub valid_contract: bool,
    pub script_size: u64,
}

message!(TransactionAdded);

/// The outputs created by a newly added transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentsReceived {
    pub transaction: TransactionAdded,
    pub outputs: Vec<Utxo>,
}

message!(PaymentsReceived);

/// A ledger event decoded from the `record` of a notification payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    Epoch(EpochAdded),
    Block(BlockAdded),
    Delegation(DelegationAdded),
    Transaction(TransactionAdded),
}

impl TryFrom<&Notification> for LedgerEvent {
    type Error = LedgerEventError;

    fn try_from(notification: &Notification) -> Result<Self, Self::Error> {
        let record = notification
            .payload
            .get("record")
            .cloned()
            .ok_or_else(|| LedgerEventError::MissingRecord(notification.channel.clone()))?;

        let event = match notification.channel.as_str() {
            NEW_EPOCH => Self::Epoch(serde_json::from_value(record)?),
            NEW_BLOCK => Self::Block(serde_json::from_value(record)?),
            NEW_DELEGATION => Self::Delegation(serde_json::from_value(record)?),
            NEW_TRANSACTION => Self::Transaction(serde_json::from_value(record)?),
            other => return Err(LedgerEventError::UnknownChannel(other.to_owned())),
        };

        Ok(event)
    }
}

#[derive(Debug, Error)]
pub enum LedgerEventError {
    #[error("payload on channel {0} has no record")]
    MissingRecord(String),

    #[error("unknown channel {0}")]
    UnknownChannel(String),

    #[error("cannot decode record")]
    Decode(#[from] serde_json::Error),
}

/// Postgres renders `bytea` as `\x`-prefixed hex in JSON; plain hex is accepted as well.
mod bytea {
    use dbsync_common::domain::ByteArray;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

    pub fn serialize<const N: usize, S>(bytes: &ByteArray<N>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        bytes.serialize(serializer)
    }

    pub fn deserialize<'de, const N: usize, D>(deserializer: D) -> Result<ByteArray<N>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let hex = s.strip_prefix("\\x").unwrap_or(&s);
        hex.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        BlockAdded, LedgerEvent, LedgerEventError, Notification, TransactionAdded,
    };
    use assert_matches::assert_matches;
    use serde_json::json;

    fn notification(channel: &str, payload: serde_json::Value) -> Notification {
        Notification {
            channel: channel.to_string(),
            payload,
        }
    }

    #[test]
    fn test_block() {
        let hash = "89d9b5a5b8ddc8d7e5a6795e9774d97faf1efea59b2caf7eaf9f8c5b32059df4";
        let payload = json!({
            "table": "block",
            "record": {
                "id": 1, "hash": format!("\\x{hash}"), "epoch_no": 0, "slot_no": null,
                "epoch_slot_no": null, "block_no": null, "previous_id": null,
                "slot_leader_id": 1, "size": 0, "time": "2017-09-23T21:44:51",
                "tx_count": 14505, "proto_major": 0, "proto_minor": 0, "vrf_key": null,
                "op_cert": null, "op_cert_counter": null
            }
        });

        let event = LedgerEvent::try_from(&notification("new_block", payload));
        assert_matches!(
            event,
            Ok(LedgerEvent::Block(BlockAdded { id: 1, hash: h, block_no: None, tx_count: 14505, .. }))
                if h.to_string() == hash
        );
    }

    #[test]
    fn test_transaction() {
        let payload = json!({
            "record": {
                "id": 42, "hash": format!("\\x{}", "ab".repeat(32)), "block_id": 7,
                "block_index": 0, "out_sum": 1000000, "fee": 168449, "deposit": 0,
                "size": 297, "invalid_before": null, "invalid_hereafter": 45000000,
                "valid_contract": true, "script_size": 0
            }
        });

        let event = LedgerEvent::try_from(&notification("new_transaction", payload));
        assert_matches!(
            event,
            Ok(LedgerEvent::Transaction(TransactionAdded { id: 42, fee: 168449, .. }))
        );

        // Round trip through a pub-sub, which serializes as plain hex.
        let Ok(LedgerEvent::Transaction(transaction)) = event else {
            panic!("expected transaction");
        };
        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["hash"], "ab".repeat(32));
        assert_eq!(
            serde_json::from_value::<TransactionAdded>(json).unwrap(),
            transaction
        );
    }

    #[test]
    fn test_invalid() {
        let event = LedgerEvent::try_from(&notification("new_block", json!({ "id": 1 })));
        assert_matches!(event, Err(LedgerEventError::MissingRecord(_)));

        let event =
            LedgerEvent::try_from(&notification("new_block", json!({ "record": { "id": 1 } })));
        assert_matches!(event, Err(LedgerEventError::Decode(_)));

        let event = LedgerEvent::try_from(&notification("new_pool", json!({ "record": {} })));
        assert_matches!(event, Err(LedgerEventError::UnknownChannel(_)));
    }
}
