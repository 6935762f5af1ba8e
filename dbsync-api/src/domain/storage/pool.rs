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

use crate::domain::{Page, Pool, PoolDelegation, PoolIdentifier};
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait PoolStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get the [Pool] for the given identifier.
    async fn get_pool(&self, pool: &PoolIdentifier) -> Result<Option<Pool>, sqlx::Error>;

    /// Get the [Pool] for the given slot leader ID.
    async fn get_pool_by_slot_leader(
        &self,
        slot_leader_id: u64,
    ) -> Result<Option<Pool>, sqlx::Error>;

    /// Get a page of the current delegators of the given pool, keyed by stake address ID.
    async fn get_pool_delegations(
        &self,
        pool: &PoolIdentifier,
        page: &Page<u64>,
    ) -> Result<Vec<PoolDelegation>, sqlx::Error>;
}
