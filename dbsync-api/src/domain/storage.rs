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

pub mod asset;
pub mod block;
pub mod epoch;
pub mod pool;
pub mod script;
pub mod stake;
pub mod transaction;
pub mod utxo;

#[cfg(test)]
pub mod fake;

use crate::domain::storage::{
    asset::AssetStorage, block::BlockStorage, epoch::EpochStorage, pool::PoolStorage,
    script::ScriptStorage, stake::StakeStorage, transaction::TransactionStorage,
    utxo::UtxoStorage,
};
use std::fmt::Debug;

/// Storage abstraction.
pub trait Storage
where
    Self: AssetStorage
        + BlockStorage
        + ConnectionStorage
        + EpochStorage
        + PoolStorage
        + ScriptStorage
        + StakeStorage
        + TransactionStorage
        + UtxoStorage,
{
}

impl<T> Storage for T where
    T: AssetStorage
        + BlockStorage
        + ConnectionStorage
        + EpochStorage
        + PoolStorage
        + ScriptStorage
        + StakeStorage
        + TransactionStorage
        + UtxoStorage
{
}

/// Lifecycle of the connections backing a storage.
#[trait_variant::make(Send)]
pub trait ConnectionStorage
where
    Self: Debug + Clone + Send + Sync + 'static + Sized,
{
    /// Close all connections; afterwards every query fails.
    async fn close(&self);

    /// Open new connections with the configuration of this storage, which must be closed.
    async fn reopen(&self) -> Result<Self, sqlx::Error>;
}
