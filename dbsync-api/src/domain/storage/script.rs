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

use crate::domain::{Datum, Page, RedeemerRow, Script};
use dbsync_common::domain::{DatumHash, ScriptHash};
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait ScriptStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    async fn get_script(&self, hash: ScriptHash) -> Result<Option<Script>, sqlx::Error>;

    /// Get a page of the redeemers of the given script, keyed by transaction ID and index.
    async fn get_script_redeemers(
        &self,
        hash: ScriptHash,
        page: &Page<(u64, u32)>,
    ) -> Result<Vec<RedeemerRow>, sqlx::Error>;

    async fn get_datum(&self, hash: DatumHash) -> Result<Option<Datum>, sqlx::Error>;
}
