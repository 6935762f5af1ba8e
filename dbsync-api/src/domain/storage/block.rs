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

use crate::domain::{Block, BlockSummary};
use dbsync_common::domain::BlockHash;
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait BlockStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get a [Block] for the given ID.
    async fn get_block_by_id(&self, id: u64) -> Result<Option<Block>, sqlx::Error>;

    /// Get a [Block] for the given hash.
    async fn get_block_by_hash(&self, hash: BlockHash) -> Result<Option<Block>, sqlx::Error>;

    /// Get the [Block] with the highest block number.
    async fn get_latest_block(&self) -> Result<Option<Block>, sqlx::Error>;

    /// Get a [BlockSummary] for the block with the given ID.
    async fn get_block_summary(&self, id: u64) -> Result<Option<BlockSummary>, sqlx::Error>;
}
