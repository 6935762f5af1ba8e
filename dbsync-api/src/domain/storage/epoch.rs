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

use crate::domain::{Epoch, EpochParameters};
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait EpochStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get the [Epoch] with the highest number.
    async fn get_latest_epoch(&self) -> Result<Option<Epoch>, sqlx::Error>;

    /// Get the [EpochParameters] in effect for the given epoch.
    async fn get_epoch_parameters(
        &self,
        epoch_no: u64,
    ) -> Result<Option<EpochParameters>, sqlx::Error>;
}
