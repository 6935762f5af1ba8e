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

//! In-memory [Storage](crate::domain::storage::Storage) for tests: list queries apply the same
//! keyset semantics as the database, singleton queries find nothing unless configured.

use crate::domain::{
    AddressTransaction, AssetAmountRow, AssetOwner, AssetRow, AssetUnit, Block, BlockSummary,
    Datum, Epoch, EpochParameters, Keyed, Metadata, Page, Pool, PoolDelegation, PoolIdentifier,
    RedeemerRow, ReferenceDatum, Script, Stake, Transaction, TransactionCounts, UtxoAssetRow,
    group_utxo_assets, paginate,
    storage::{
        ConnectionStorage, asset::AssetStorage, block::BlockStorage, epoch::EpochStorage,
        pool::PoolStorage, script::ScriptStorage, stake::StakeStorage,
        transaction::TransactionStorage, utxo::UtxoStorage,
    },
};
use dbsync_common::domain::{
    BlockHash, DatumHash, PolicyId, RawAssetName, ScriptHash, TransactionHash,
};
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Debug, Clone, Default)]
pub struct FakeStorage {
    pub utxo_rows: Vec<UtxoAssetRow>,
    pub asset: Option<AssetRow>,
    pub asset_metadata: Vec<Metadata>,
    pub reference_datums: Vec<ReferenceDatum>,
    pub queries: Arc<AtomicUsize>,
    pub reopened: Arc<AtomicUsize>,

    /// Counted queries fail as if the pool was exhausted.
    pub failing: bool,
}

impl FakeStorage {
    fn query(&self) -> Result<(), sqlx::Error> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            Err(sqlx::Error::PoolTimedOut)
        } else {
            Ok(())
        }
    }
}

impl ConnectionStorage for FakeStorage {
    async fn close(&self) {}

    async fn reopen(&self) -> Result<Self, sqlx::Error> {
        self.reopened.fetch_add(1, Ordering::SeqCst);
        Ok(self.clone())
    }
}

impl BlockStorage for FakeStorage {
    async fn get_block_by_id(&self, _id: u64) -> Result<Option<Block>, sqlx::Error> {
        self.query()?;
        Ok(None)
    }

    async fn get_block_by_hash(&self, _hash: BlockHash) -> Result<Option<Block>, sqlx::Error> {
        self.query()?;
        Ok(None)
    }

    async fn get_latest_block(&self) -> Result<Option<Block>, sqlx::Error> {
        self.query()?;
        Ok(None)
    }

    async fn get_block_summary(&self, _id: u64) -> Result<Option<BlockSummary>, sqlx::Error> {
        Ok(None)
    }
}

impl TransactionStorage for FakeStorage {
    async fn get_transaction_by_id(&self, _id: u64) -> Result<Option<Transaction>, sqlx::Error> {
        Ok(None)
    }

    async fn get_transaction_by_hash(
        &self,
        _hash: TransactionHash,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        Ok(None)
    }

    async fn get_transaction_counts(&self, _id: u64) -> Result<TransactionCounts, sqlx::Error> {
        Ok(TransactionCounts::default())
    }

    async fn get_transaction_assets(
        &self,
        _id: u64,
    ) -> Result<Vec<AssetAmountRow>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_block_transactions(
        &self,
        _block_no: u64,
        _page: &Page<u64>,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        self.query()?;
        Ok(vec![])
    }

    async fn get_transactions_by_block_id(
        &self,
        _block_id: u64,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_transaction_metadata(
        &self,
        _hash: TransactionHash,
    ) -> Result<Vec<Metadata>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_address_transactions(
        &self,
        _address: &str,
        _page: &Page<u64>,
    ) -> Result<Vec<AddressTransaction>, sqlx::Error> {
        Ok(vec![])
    }
}

impl UtxoStorage for FakeStorage {
    async fn get_transaction_output_rows(
        &self,
        _hash: TransactionHash,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_transaction_input_rows(
        &self,
        _hash: TransactionHash,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_transaction_output_rows_by_id(
        &self,
        tx_id: u64,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        let rows = self
            .utxo_rows
            .iter()
            .filter(|row| row.tx_id == tx_id)
            .cloned()
            .collect();
        Ok(rows)
    }

    /// Same semantics as the store: the page limits outputs, their rows stay adjacent.
    async fn get_address_utxo_rows(
        &self,
        address: &str,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        self.query()?;

        let rows = self.utxo_rows.iter().filter(|row| row.address == address);
        let keys = paginate(group_utxo_assets(rows.clone()), page)
            .iter()
            .map(Keyed::key)
            .collect::<Vec<_>>();
        let selected = keys.iter().copied().collect::<HashSet<_>>();

        let mut rows = rows
            .filter(|row| selected.contains(&(row.tx_id, row.index)))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by_key(|row| keys.iter().position(|key| *key == (row.tx_id, row.index)));

        Ok(rows)
    }

    async fn get_stake_utxo_rows(
        &self,
        _stake_address: &str,
        _page: &Page<(u64, u32)>,
    ) -> Result<Vec<UtxoAssetRow>, sqlx::Error> {
        Ok(vec![])
    }
}

impl AssetStorage for FakeStorage {
    async fn get_asset_unit_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<AssetUnit>, sqlx::Error> {
        let unit = self
            .asset
            .as_ref()
            .filter(|asset| asset.fingerprint == fingerprint)
            .map(|asset| AssetUnit {
                policy_id: asset.policy_id,
                name: asset.name.clone(),
            });
        Ok(unit)
    }

    async fn get_asset(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
    ) -> Result<Option<AssetRow>, sqlx::Error> {
        let asset = self
            .asset
            .clone()
            .filter(|asset| asset.policy_id == *policy_id && asset.name == *name);
        Ok(asset)
    }

    async fn get_latest_asset_metadata(
        &self,
        _policy_id: &PolicyId,
        _name: &RawAssetName,
    ) -> Result<Vec<Metadata>, sqlx::Error> {
        Ok(self.asset_metadata.clone())
    }

    async fn get_reference_datums(
        &self,
        _policy_id: &PolicyId,
        _reference_name: &RawAssetName,
    ) -> Result<Vec<ReferenceDatum>, sqlx::Error> {
        Ok(self.reference_datums.clone())
    }

    async fn get_asset_owners(
        &self,
        _policy_id: &PolicyId,
        _name: &RawAssetName,
        _page: &Page<(String, i128)>,
    ) -> Result<Vec<AssetOwner>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_policy_assets(
        &self,
        _policy_id: &PolicyId,
        _page: &Page<RawAssetName>,
    ) -> Result<Vec<AssetAmountRow>, sqlx::Error> {
        Ok(vec![])
    }
}

impl StakeStorage for FakeStorage {
    async fn get_stake(&self, _stake_address: &str) -> Result<Option<Stake>, sqlx::Error> {
        Ok(None)
    }

    async fn get_stake_addresses(
        &self,
        _stake_address: &str,
        _page: &Page<String>,
    ) -> Result<Vec<String>, sqlx::Error> {
        Ok(vec![])
    }
}

impl PoolStorage for FakeStorage {
    async fn get_pool(&self, _pool: &PoolIdentifier) -> Result<Option<Pool>, sqlx::Error> {
        Ok(None)
    }

    async fn get_pool_by_slot_leader(
        &self,
        _slot_leader_id: u64,
    ) -> Result<Option<Pool>, sqlx::Error> {
        Ok(None)
    }

    async fn get_pool_delegations(
        &self,
        _pool: &PoolIdentifier,
        _page: &Page<u64>,
    ) -> Result<Vec<PoolDelegation>, sqlx::Error> {
        Ok(vec![])
    }
}

impl ScriptStorage for FakeStorage {
    async fn get_script(&self, _hash: ScriptHash) -> Result<Option<Script>, sqlx::Error> {
        Ok(None)
    }

    async fn get_script_redeemers(
        &self,
        _hash: ScriptHash,
        _page: &Page<(u64, u32)>,
    ) -> Result<Vec<RedeemerRow>, sqlx::Error> {
        Ok(vec![])
    }

    async fn get_datum(&self, _hash: DatumHash) -> Result<Option<Datum>, sqlx::Error> {
        Ok(None)
    }
}

impl EpochStorage for FakeStorage {
    async fn get_latest_epoch(&self) -> Result<Option<Epoch>, sqlx::Error> {
        Ok(None)
    }

    async fn get_epoch_parameters(
        &self,
        _epoch_no: u64,
    ) -> Result<Option<EpochParameters>, sqlx::Error> {
        Ok(None)
    }
}
