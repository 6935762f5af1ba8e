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

use crate::domain::{Page, Stake};
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait StakeStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get the [Stake] of the given stake address; `None` if it was never registered.
    async fn get_stake(&self, stake_address: &str) -> Result<Option<Stake>, sqlx::Error>;

    /// Get a page of the payment addresses associated with the given stake address.
    async fn get_stake_addresses(
        &self,
        stake_address: &str,
        page: &Page<String>,
    ) -> Result<Vec<String>, sqlx::Error>;
}
