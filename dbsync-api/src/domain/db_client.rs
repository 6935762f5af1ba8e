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
    AddressTransaction, Asset, AssetAmount, AssetIdentifier, AssetOwner, AssetUnit, Block,
    Cip68Label, Datum, Epoch, EpochParameters, Error, IdOrHash, Identifier, Metadata, Page,
    PageRequest, Pool, PoolDelegation, PoolIdentifier, Redeemer, Script, Stake, Transaction,
    TransactionDetails, TransactionUtxos, Utxo, datum_to_metadata, group_utxo_assets,
    parse_address, parse_stake_address, reference_name, storage::Storage,
};
use async_stream::try_stream;
use dbsync_common::{
    domain::{PolicyId, RawAssetName},
    stream::flatten_chunks,
};
use derive_more::Display;
use fastrace::trace;
use futures::Stream;
use log::{info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

/// Whether a [DbClient] may query its storage.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    #[display("active")]
    Active,

    #[display("closed")]
    Closed,
}

#[derive(Debug)]
enum Connection<S> {
    Active(S),
    Closed(S),
}

/// Typed read API over a cardano-db-sync database. Identifiers and page sizes are validated
/// before any query is issued; while disconnected every query fails with
/// [Error::Disconnected] without touching the storage.
#[derive(Debug, Clone)]
pub struct DbClient<S> {
    connection: Arc<RwLock<Connection<S>>>,
}

impl<S> DbClient<S>
where
    S: Storage,
{
    pub fn new(storage: S) -> Self {
        Self {
            connection: Arc::new(RwLock::new(Connection::Active(storage))),
        }
    }

    pub fn state(&self) -> ConnectionState {
        match &*self.connection.read() {
            Connection::Active(_) => ConnectionState::Active,
            Connection::Closed(_) => ConnectionState::Closed,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Active
    }

    /// Close the connections of the storage; a no-op if already disconnected.
    pub async fn disconnect(&self) {
        let storage = {
            let mut connection = self.connection.write();
            let storage = match &*connection {
                Connection::Active(storage) => storage.clone(),
                Connection::Closed(_) => return,
            };
            *connection = Connection::Closed(storage.clone());
            storage
        };

        storage.close().await;
        info!("disconnected");
    }

    /// Reopen the connections of the storage; a no-op if already connected.
    pub async fn reconnect(&self) -> Result<(), Error> {
        let closed = match &*self.connection.read() {
            Connection::Active(_) => return Ok(()),
            Connection::Closed(storage) => storage.clone(),
        };

        let storage = closed.reopen().await?;

        let superfluous = {
            let mut connection = self.connection.write();
            if matches!(*connection, Connection::Closed(_)) {
                *connection = Connection::Active(storage);
                None
            } else {
                // Reconnected concurrently.
                Some(storage)
            }
        };

        match superfluous {
            Some(storage) => storage.close().await,
            None => info!("reconnected"),
        }

        Ok(())
    }

    fn storage(&self) -> Result<S, Error> {
        match &*self.connection.read() {
            Connection::Active(storage) => Ok(storage.clone()),
            Connection::Closed(_) => Err(Error::Disconnected),
        }
    }

    /// Get a [Block] by ID or hash.
    #[trace(properties = { "id_or_hash": "{id_or_hash}" })]
    pub async fn get_block(&self, id_or_hash: &str) -> Result<Option<Block>, Error> {
        let storage = self.storage()?;

        let block = match Identifier::parse(id_or_hash)?.into_id_or_hash()? {
            IdOrHash::Id(id) => storage.get_block_by_id(id).await?,
            IdOrHash::Hash(hash) => storage.get_block_by_hash(hash).await?,
        };

        Ok(block)
    }

    #[trace]
    pub async fn get_latest_block(&self) -> Result<Option<Block>, Error> {
        let block = self.storage()?.get_latest_block().await?;
        Ok(block)
    }

    /// Get a page of the transactions of the block with the given block number, shallow.
    #[trace(properties = { "block_no": "{block_no}" })]
    pub async fn get_block_transactions(
        &self,
        block_no: u64,
        page: PageRequest<u64>,
    ) -> Result<Vec<Transaction>, Error> {
        let storage = self.storage()?;
        let page = Page::try_from(page)?;

        let transactions = storage.get_block_transactions(block_no, &page).await?;
        Ok(transactions)
    }

    /// Get all transactions of the block with the given ID, shallow.
    #[trace(properties = { "block_id": "{block_id}" })]
    pub async fn get_block_transactions_by_id(
        &self,
        block_id: u64,
    ) -> Result<Vec<Transaction>, Error> {
        let transactions = self
            .storage()?
            .get_transactions_by_block_id(block_id)
            .await?;
        Ok(transactions)
    }

    /// Get a [Transaction] by ID or hash. Shallow reads omit the block and the details.
    #[trace(properties = { "id_or_hash": "{id_or_hash}", "shallow": "{shallow}" })]
    pub async fn get_transaction(
        &self,
        id_or_hash: &str,
        shallow: bool,
    ) -> Result<Option<Transaction>, Error> {
        let storage = self.storage()?;

        let transaction = match Identifier::parse(id_or_hash)?.into_id_or_hash()? {
            IdOrHash::Id(id) => storage.get_transaction_by_id(id).await?,
            IdOrHash::Hash(hash) => storage.get_transaction_by_hash(hash).await?,
        };
        let Some(mut transaction) = transaction else {
            return Ok(None);
        };

        if !shallow {
            transaction.block = storage.get_block_summary(transaction.block_id).await?;

            let counts = storage.get_transaction_counts(transaction.id).await?;
            let assets = storage
                .get_transaction_assets(transaction.id)
                .await?
                .into_iter()
                .map(AssetAmount::from)
                .collect();
            transaction.details = Some(TransactionDetails { counts, assets });
        }

        Ok(Some(transaction))
    }

    /// Get the outputs consumed and created by the transaction with the given hash.
    #[trace(properties = { "hash": "{hash}" })]
    pub async fn get_transaction_utxos(&self, hash: &str) -> Result<TransactionUtxos, Error> {
        let storage = self.storage()?;
        let hash = Identifier::parse(hash)?.into_hash()?;

        let inputs = storage.get_transaction_input_rows(hash).await?;
        let outputs = storage.get_transaction_output_rows(hash).await?;

        Ok(TransactionUtxos {
            hash,
            inputs: group_utxo_assets(inputs),
            outputs: group_utxo_assets(outputs),
        })
    }

    /// Get the outputs consumed by the transaction with the given hash.
    #[trace(properties = { "hash": "{hash}" })]
    pub async fn get_transaction_input_utxos(&self, hash: &str) -> Result<Vec<Utxo>, Error> {
        let storage = self.storage()?;
        let hash = Identifier::parse(hash)?.into_hash()?;

        let inputs = storage.get_transaction_input_rows(hash).await?;
        Ok(group_utxo_assets(inputs))
    }

    /// Get the outputs created by the transaction with the given ID.
    #[trace(properties = { "tx_id": "{tx_id}" })]
    pub async fn get_transaction_utxos_by_id(&self, tx_id: u64) -> Result<Vec<Utxo>, Error> {
        let outputs = self
            .storage()?
            .get_transaction_output_rows_by_id(tx_id)
            .await?;
        Ok(group_utxo_assets(outputs))
    }

    #[trace(properties = { "hash": "{hash}" })]
    pub async fn get_transaction_metadata(&self, hash: &str) -> Result<Vec<Metadata>, Error> {
        let storage = self.storage()?;
        let hash = Identifier::parse(hash)?.into_hash()?;

        let metadata = storage.get_transaction_metadata(hash).await?;
        Ok(metadata)
    }

    /// Get a page of the unspent outputs at the given address.
    #[trace(properties = { "address": "{address}" })]
    pub async fn get_address_utxos(
        &self,
        address: &str,
        page: PageRequest<(u64, u32)>,
    ) -> Result<Vec<Utxo>, Error> {
        let storage = self.storage()?;
        let address = parse_address(address)?;
        let page = Page::try_from(page)?;

        let rows = storage.get_address_utxo_rows(&address, &page).await?;
        Ok(group_utxo_assets(rows))
    }

    /// Stream all unspent outputs at the given address, fetching pages of the requested size
    /// starting after the requested cursor.
    pub fn stream_address_utxos(
        &self,
        address: &str,
        page: PageRequest<(u64, u32)>,
    ) -> impl Stream<Item = Result<Utxo, Error>> + use<S> {
        let client = self.clone();
        let address = address.to_owned();

        let chunks = try_stream! {
            let mut page = Page::try_from(page)?;
            let address = parse_address(&address)?;

            loop {
                let rows = client.storage()?.get_address_utxo_rows(&address, &page).await?;
                let utxos = group_utxo_assets(rows);

                match utxos.last() {
                    Some(last) => page = page.next(last),
                    None => break,
                }

                yield utxos;
            }
        };

        flatten_chunks(chunks)
    }

    /// Get a page of the transactions with an input or an output at the given address.
    #[trace(properties = { "address": "{address}" })]
    pub async fn get_address_transactions(
        &self,
        address: &str,
        page: PageRequest<u64>,
    ) -> Result<Vec<AddressTransaction>, Error> {
        let storage = self.storage()?;
        let address = parse_address(address)?;
        let page = Page::try_from(page)?;

        let transactions = storage.get_address_transactions(&address, &page).await?;
        Ok(transactions)
    }

    #[trace(properties = { "stake_address": "{stake_address}" })]
    pub async fn get_stake(&self, stake_address: &str) -> Result<Option<Stake>, Error> {
        let storage = self.storage()?;
        let stake_address = parse_stake_address(stake_address)?;

        let stake = storage.get_stake(&stake_address).await?;
        Ok(stake)
    }

    /// Get a page of the unspent outputs of the given stake address.
    #[trace(properties = { "stake_address": "{stake_address}" })]
    pub async fn get_stake_utxos(
        &self,
        stake_address: &str,
        page: PageRequest<(u64, u32)>,
    ) -> Result<Vec<Utxo>, Error> {
        let storage = self.storage()?;
        let stake_address = parse_stake_address(stake_address)?;
        let page = Page::try_from(page)?;

        let rows = storage.get_stake_utxo_rows(&stake_address, &page).await?;
        Ok(group_utxo_assets(rows))
    }

    /// Get a page of the payment addresses associated with the given stake address.
    #[trace(properties = { "stake_address": "{stake_address}" })]
    pub async fn get_stake_addresses(
        &self,
        stake_address: &str,
        page: PageRequest<String>,
    ) -> Result<Vec<String>, Error> {
        let storage = self.storage()?;
        let stake_address = parse_stake_address(stake_address)?;
        let page = Page::try_from(page)?;

        let addresses = storage.get_stake_addresses(&stake_address, &page).await?;
        Ok(addresses)
    }

    /// Get a [Pool] by bech32 ID or hash.
    #[trace(properties = { "pool_id": "{pool_id}" })]
    pub async fn get_pool(&self, pool_id: &str) -> Result<Option<Pool>, Error> {
        let storage = self.storage()?;
        let pool = PoolIdentifier::try_from(Identifier::parse(pool_id)?)?;

        let pool = storage.get_pool(&pool).await?;
        Ok(pool)
    }

    #[trace(properties = { "slot_leader_id": "{slot_leader_id}" })]
    pub async fn get_pool_by_slot_leader(&self, slot_leader_id: u64) -> Result<Option<Pool>, Error> {
        let pool = self
            .storage()?
            .get_pool_by_slot_leader(slot_leader_id)
            .await?;
        Ok(pool)
    }

    /// Get a page of the current delegators of the given pool.
    #[trace(properties = { "pool_id": "{pool_id}" })]
    pub async fn get_pool_delegations(
        &self,
        pool_id: &str,
        page: PageRequest<u64>,
    ) -> Result<Vec<PoolDelegation>, Error> {
        let storage = self.storage()?;
        let pool = PoolIdentifier::try_from(Identifier::parse(pool_id)?)?;
        let page = Page::try_from(page)?;

        let delegations = storage.get_pool_delegations(&pool, &page).await?;
        Ok(delegations)
    }

    /// Get an [Asset] by policy ID and asset name in hex or by fingerprint, with its effective
    /// metadata: for CIP-68 user tokens the datum of the reference token, otherwise the metadata
    /// of the latest mint carrying any.
    #[trace(properties = { "identifier": "{identifier}" })]
    pub async fn get_asset(&self, identifier: &str) -> Result<Option<Asset>, Error> {
        let storage = self.storage()?;
        let identifier = AssetIdentifier::try_from(Identifier::parse(identifier)?)?;

        let Some(AssetUnit { policy_id, name }) = asset_unit(&storage, identifier).await? else {
            return Ok(None);
        };
        let Some(row) = storage.get_asset(&policy_id, &name).await? else {
            return Ok(None);
        };
        let metadata = asset_metadata(&storage, &policy_id, &name).await?;

        Ok(Some(Asset::new(row, metadata)))
    }

    /// Get a page of the addresses holding the given asset class in unspent outputs.
    #[trace(properties = { "identifier": "{identifier}" })]
    pub async fn get_asset_owners(
        &self,
        identifier: &str,
        page: PageRequest<(String, i128)>,
    ) -> Result<Vec<AssetOwner>, Error> {
        let storage = self.storage()?;
        let identifier = AssetIdentifier::try_from(Identifier::parse(identifier)?)?;
        let page = Page::try_from(page)?;

        let Some(AssetUnit { policy_id, name }) = asset_unit(&storage, identifier).await? else {
            return Ok(vec![]);
        };
        let owners = storage.get_asset_owners(&policy_id, &name, &page).await?;

        Ok(owners)
    }

    /// Get a page of the asset classes of the given policy with their net quantities.
    #[trace(properties = { "policy_id": "{policy_id}" })]
    pub async fn get_policy_assets(
        &self,
        policy_id: &str,
        page: PageRequest<RawAssetName>,
    ) -> Result<Vec<AssetAmount>, Error> {
        let storage = self.storage()?;
        let policy_id = Identifier::parse(policy_id)?.into_hash()?;
        let page = Page::try_from(page)?;

        let assets = storage
            .get_policy_assets(&policy_id, &page)
            .await?
            .into_iter()
            .map(AssetAmount::from)
            .collect();

        Ok(assets)
    }

    #[trace(properties = { "hash": "{hash}" })]
    pub async fn get_script(&self, hash: &str) -> Result<Option<Script>, Error> {
        let storage = self.storage()?;
        let hash = Identifier::parse(hash)?.into_hash()?;

        let script = storage.get_script(hash).await?;
        Ok(script)
    }

    /// Get a page of the redeemers of the given script.
    #[trace(properties = { "hash": "{hash}" })]
    pub async fn get_script_redeemers(
        &self,
        hash: &str,
        page: PageRequest<(u64, u32)>,
    ) -> Result<Vec<Redeemer>, Error> {
        let storage = self.storage()?;
        let hash = Identifier::parse(hash)?.into_hash()?;
        let page = Page::try_from(page)?;

        let redeemers = storage
            .get_script_redeemers(hash, &page)
            .await?
            .into_iter()
            .map(Redeemer::from)
            .collect();

        Ok(redeemers)
    }

    #[trace(properties = { "hash": "{hash}" })]
    pub async fn get_datum(&self, hash: &str) -> Result<Option<Datum>, Error> {
        let storage = self.storage()?;
        let hash = Identifier::parse(hash)?.into_hash()?;

        let datum = storage.get_datum(hash).await?;
        Ok(datum)
    }

    #[trace]
    pub async fn get_latest_epoch(&self) -> Result<Option<Epoch>, Error> {
        let epoch = self.storage()?.get_latest_epoch().await?;
        Ok(epoch)
    }

    #[trace(properties = { "epoch_no": "{epoch_no}" })]
    pub async fn get_epoch_parameters(
        &self,
        epoch_no: u64,
    ) -> Result<Option<EpochParameters>, Error> {
        let parameters = self.storage()?.get_epoch_parameters(epoch_no).await?;
        Ok(parameters)
    }
}

async fn asset_unit<S>(
    storage: &S,
    identifier: AssetIdentifier,
) -> Result<Option<AssetUnit>, Error>
where
    S: Storage,
{
    match identifier {
        AssetIdentifier::Unit { policy_id, name } => Ok(Some(AssetUnit { policy_id, name })),

        AssetIdentifier::Fingerprint(fingerprint) => {
            let unit = storage.get_asset_unit_by_fingerprint(&fingerprint).await?;
            Ok(unit)
        }
    }
}

async fn asset_metadata<S>(
    storage: &S,
    policy_id: &PolicyId,
    name: &RawAssetName,
) -> Result<Vec<Metadata>, Error>
where
    S: Storage,
{
    let user_token_reference = Cip68Label::of(name.as_ref())
        .filter(|label| label.is_user_token())
        .and_then(|_| reference_name(name.as_ref()));

    let Some(reference_name) = user_token_reference else {
        let metadata = storage.get_latest_asset_metadata(policy_id, name).await?;
        return Ok(metadata);
    };

    let datums = storage.get_reference_datums(policy_id, &reference_name).await?;
    let metadata = match datums.as_slice() {
        [] => {
            warn!(
                policy_id:%, asset_name:% = name;
                "resolution degraded, no unspent output holds the reference token"
            );
            vec![]
        }

        [latest, rest @ ..] => {
            if !rest.is_empty() {
                warn!(
                    policy_id:%, asset_name:% = name, count = datums.len();
                    "reference token held by multiple unspent outputs, using the most recent"
                );
            }

            match &latest.value {
                Some(datum) => vec![datum_to_metadata(policy_id, name.as_ref(), datum)],

                None => {
                    warn!(
                        policy_id:%, asset_name:% = name;
                        "resolution degraded, reference token output has no datum"
                    );
                    vec![]
                }
            }
        }
    };

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        AssetRow, ConnectionState, DbClient, Error, Keyed, Metadata, PageRequest, ReferenceDatum,
        UtxoAssetRow, storage::fake::FakeStorage,
    };
    use assert_matches::assert_matches;
    use dbsync_common::domain::{ByteArray, Order, RawAssetName};
    use futures::{StreamExt, TryStreamExt};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    const ADDRESS: &str = "addr1vpu5vlrf4xkxv2qpwngf6cjhtw542ayty80v8dyr49rf5eg0yu80w";

    fn utxo_row(tx_id: u64, index: u32, asset_name: Option<&[u8]>) -> UtxoAssetRow {
        UtxoAssetRow {
            tx_id,
            address: ADDRESS.to_string(),
            hash: ByteArray([tx_id as u8; 32]),
            index,
            value: 1_000_000,
            has_script: false,
            datum_hash: None,
            inline_datum_hash: None,
            inline_datum_value: None,
            inline_datum_bytes: None,
            reference_script_hash: None,
            reference_script_type: None,
            script_hash: None,
            script_type: None,
            policy_id: asset_name.map(|_| ByteArray([1; 28])),
            asset_name: asset_name.map(RawAssetName::from),
            quantity: asset_name.map(|_| 1),
            fingerprint: None,
        }
    }

    fn asset_row(name: &[u8]) -> AssetRow {
        AssetRow {
            policy_id: ByteArray([1; 28]),
            name: name.into(),
            fingerprint: "asset1rjklcrnsdzqp65wjgrg55sy9723kw09mlgvlc3".to_string(),
            quantity: 1,
            mint_quantity: 1,
            burn_quantity: 0,
            mint_or_burn_count: 1,
            initial_mint_tx_hash: ByteArray([2; 32]),
            created_at: 1_700_000_000,
        }
    }

    fn nft_name() -> Vec<u8> {
        [[0x00, 0x0d, 0xe1, 0x40].as_slice(), b"Token"].concat()
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let storage = FakeStorage::default();
        let client = DbClient::new(storage.clone());

        assert_matches!(
            client.get_block("xyz").await,
            Err(Error::InvalidIdentifier(_))
        );
        assert_matches!(
            client.get_block_transactions(1, PageRequest::new(0, Order::Asc)).await,
            Err(Error::InvalidPageSize(_))
        );
        assert_matches!(
            client.get_address_utxos(ADDRESS, PageRequest::new(-1, Order::Desc)).await,
            Err(Error::InvalidPageSize(_))
        );
        assert_matches!(
            client.get_stake_addresses(ADDRESS, PageRequest::default()).await,
            Err(Error::InvalidIdentifier(_))
        );
        assert_eq!(storage.queries.load(Ordering::SeqCst), 0);

        assert_matches!(client.get_block("42").await, Ok(None));
        assert_eq!(storage.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let storage = FakeStorage::default();
        let client = DbClient::new(storage.clone());
        assert_eq!(client.state(), ConnectionState::Active);

        client.disconnect().await;
        assert!(!client.is_connected());
        assert_matches!(client.get_latest_block().await, Err(Error::Disconnected));
        assert_matches!(
            client.get_block(&"00".repeat(32)).await,
            Err(Error::Disconnected)
        );
        assert_eq!(storage.queries.load(Ordering::SeqCst), 0);

        client.reconnect().await.unwrap();
        client.reconnect().await.unwrap();
        assert_eq!(storage.reopened.load(Ordering::SeqCst), 1);
        assert!(client.is_connected());
        assert_matches!(client.get_latest_block().await, Ok(None));
    }

    #[tokio::test]
    async fn test_query_failed() {
        let storage = FakeStorage {
            utxo_rows: vec![utxo_row(1, 0, None)],
            failing: true,
            ..Default::default()
        };
        let client = DbClient::new(storage.clone());

        assert_matches!(client.get_block("42").await, Err(Error::QueryFailed(_)));
        assert_eq!(storage.queries.load(Ordering::SeqCst), 1);

        let utxos = client
            .stream_address_utxos(ADDRESS, PageRequest::new(2, Order::Asc))
            .collect::<Vec<_>>()
            .await;
        assert_matches!(utxos.as_slice(), [Err(Error::QueryFailed(_))]);
        assert_eq!(storage.queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_address_utxos_page() {
        let storage = FakeStorage {
            utxo_rows: vec![
                utxo_row(351575, 0, None),
                utxo_row(351576, 0, Some(b"a")),
                utxo_row(351576, 0, Some(b"b")),
                utxo_row(351576, 1, None),
                utxo_row(351576, 2, None),
                utxo_row(351576, 3, None),
                utxo_row(351500, 7, Some(b"c")),
                utxo_row(351400, 0, None),
                utxo_row(351300, 1, None),
            ],
            ..Default::default()
        };
        let client = DbClient::new(storage);

        let page = PageRequest::new(4, Order::Desc).after((351576, 2));
        let utxos = client.get_address_utxos(ADDRESS, page).await.unwrap();

        let keys = utxos.iter().map(Keyed::key).collect::<Vec<_>>();
        assert_eq!(keys, vec![(351576, 1), (351576, 0), (351575, 0), (351500, 7)]);
        assert_eq!(utxos[1].assets.len(), 2);
        assert_eq!(utxos[3].assets[0].raw_asset_name.as_ref(), b"c");
    }

    #[tokio::test]
    async fn test_stream_address_utxos() {
        let storage = FakeStorage {
            utxo_rows: (0..5)
                .flat_map(|tx_id| [utxo_row(tx_id, 0, Some(b"a")), utxo_row(tx_id, 0, Some(b"b"))])
                .collect(),
            ..Default::default()
        };
        let client = DbClient::new(storage.clone());

        let utxos = client
            .stream_address_utxos(ADDRESS, PageRequest::new(2, Order::Asc))
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        let keys = utxos.iter().map(Keyed::key).collect::<Vec<_>>();
        assert_eq!(keys, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert!(utxos.iter().all(|utxo| utxo.assets.len() == 2));

        // Three full or partial pages and one empty page.
        assert_eq!(storage.queries.load(Ordering::SeqCst), 4);

        let utxos = client
            .stream_address_utxos(ADDRESS, PageRequest::new(0, Order::Asc))
            .try_collect::<Vec<_>>()
            .await;
        assert_matches!(utxos, Err(Error::InvalidPageSize(_)));
    }

    #[tokio::test]
    async fn test_asset_metadata() {
        let metadata = Metadata {
            label: 721,
            json: json!({ "name": "Token" }),
        };

        // Not a CIP-68 token.
        let storage = FakeStorage {
            asset: Some(asset_row(b"Token")),
            asset_metadata: vec![metadata.clone()],
            ..Default::default()
        };
        let client = DbClient::new(storage);
        let identifier = format!("{}{}", "01".repeat(28), const_hex::encode(b"Token"));
        let asset = client.get_asset(&identifier).await.unwrap();
        assert_matches!(asset, Some(asset) if asset.metadata == vec![metadata.clone()]);

        // CIP-68 user token without a reference token.
        let storage = FakeStorage {
            asset: Some(asset_row(&nft_name())),
            asset_metadata: vec![metadata],
            ..Default::default()
        };
        let client = DbClient::new(storage);
        let asset = client
            .get_asset("asset1rjklcrnsdzqp65wjgrg55sy9723kw09mlgvlc3")
            .await
            .unwrap();
        assert_matches!(asset, Some(asset) if asset.metadata.is_empty() && asset.asset_name == "Token");

        // CIP-68 user token with multiple reference tokens.
        let storage = FakeStorage {
            asset: Some(asset_row(&nft_name())),
            reference_datums: vec![
                ReferenceDatum {
                    tx_id: 2,
                    value: Some(json!({
                        "constructor": 0,
                        "fields": [
                            { "map": [{ "k": { "bytes": "6e616d65" }, "v": { "bytes": "4e6577" } }] },
                            { "int": 1 }
                        ]
                    })),
                },
                ReferenceDatum {
                    tx_id: 1,
                    value: Some(json!({ "constructor": 0, "fields": [] })),
                },
            ],
            ..Default::default()
        };
        let client = DbClient::new(storage);
        let asset = client
            .get_asset(&format!("{}{}", "01".repeat(28), const_hex::encode(nft_name())))
            .await
            .unwrap();
        assert_matches!(
            asset,
            Some(asset) if asset.metadata.len() == 1 && asset.metadata[0].label == 222
        );

        let client = DbClient::new(FakeStorage::default());
        assert_matches!(
            client.get_asset("asset1rjklcrnsdzqp65wjgrg55sy9723kw09mlgvlc3").await,
            Ok(None)
        );
        assert_matches!(
            client.get_asset("addr1vpu5vlrf4xkxv2qpwngf6cjhtw542ayty80v8dyr49rf5eg0yu80w").await,
            Err(Error::InvalidIdentifier(_))
        );
    }

    #[tokio::test]
    async fn test_transaction_utxos_by_id() {
        let storage = FakeStorage {
            utxo_rows: vec![utxo_row(7, 0, Some(b"a")), utxo_row(7, 1, None), utxo_row(8, 0, None)],
            ..Default::default()
        };
        let client = DbClient::new(storage);

        let utxos = client.get_transaction_utxos_by_id(7).await.unwrap();
        assert_eq!(utxos.len(), 2);
        assert_eq!(utxos[0].assets.len(), 1);
        assert!(utxos[1].assets.is_empty());
    }
}
