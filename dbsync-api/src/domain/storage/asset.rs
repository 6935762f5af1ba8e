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

use crate::domain::{
    AssetAmountRow, AssetOwner, AssetRow, AssetUnit, Metadata, Page, ReferenceDatum,
};
use dbsync_common::domain::{PolicyId, RawAssetName};
use std::fmt::Debug;

#[trait_variant::make(Send)]
pub trait AssetStorage
where
    Self: Debug + Clone + Send + Sync + 'static,
{
    /// Get the [AssetUnit] for the given fingerprint.
    async fn get_asset_unit_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<AssetUnit>, sqlx::Error>;

    /// Get the mint and burn aggregates of the given asset class; `None` if it was never minted.
    async fn get_asset(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
    ) -> Result<Option<AssetRow>, sqlx::Error>;

    /// Get all [Metadata] of the latest transaction minting the given asset class which carries
    /// metadata at all.
    async fn get_latest_asset_metadata(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
    ) -> Result<Vec<Metadata>, sqlx::Error>;

    /// Get the datums of the unspent outputs holding the given reference token, most recent
    /// first.
    async fn get_reference_datums(
        &self,
        policy_id: &PolicyId,
        reference_name: &RawAssetName,
    ) -> Result<Vec<ReferenceDatum>, sqlx::Error>;

    /// Get a page of the addresses holding the given asset class in unspent outputs, keyed by
    /// address and quantity.
    async fn get_asset_owners(
        &self,
        policy_id: &PolicyId,
        name: &RawAssetName,
        page: &Page<(String, i128)>,
    ) -> Result<Vec<AssetOwner>, sqlx::Error>;

    /// Get a page of the asset classes of the given policy with their net quantities, keyed by
    /// asset name.
    async fn get_policy_assets(
        &self,
        policy_id: &PolicyId,
        page: &Page<RawAssetName>,
    ) -> Result<Vec<AssetAmountRow>, sqlx::Error>;
}
