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
    BlockAdded, Bridge, DbClient, DelegationAdded, EpochAdded, Handler, LEDGER_CHANNELS,
    LedgerEvent, Listener, Notification, PaymentsReceived, TransactionAdded, storage::Storage,
};
use anyhow::{Context, bail};
use dbsync_common::{
    domain::{Message, Publisher, Subscriber},
    error::StdErrorExt,
};
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use serde::Deserialize;
use std::{error::Error as StdError, pin::pin};
use tokio::{sync::mpsc, task};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Config {
    /// Whether to publish [PaymentsReceived] with the outputs of each new transaction.
    #[serde(default = "fetch_payments_default")]
    pub fetch_payments: bool,
}

/// Listen for ledger change notifications and publish them as typed events until the
/// notification connection is lost, which is returned as error.
pub async fn run<L, S>(
    config: Config,
    mut bridge: Bridge<L>,
    db_client: DbClient<S>,
    publisher: impl Publisher,
) -> anyhow::Result<()>
where
    L: Listener,
    S: Storage,
{
    let (sender, mut receiver) = mpsc::unbounded_channel();
    for channel in LEDGER_CHANNELS {
        bridge.subscribe(channel, Handler::queue(sender.clone()));
    }
    drop(sender);

    bridge
        .connect()
        .await
        .context("connect notification bridge")?;

    // The queue closes once the bridge, which owns the senders, is dropped.
    let bridge_task = task::spawn(async move {
        bridge.run().await.context("run notification bridge")
    });

    let publish_task = task::spawn(async move {
        while let Some(notification) = receiver.recv().await {
            if let Err(error) = publish(&notification, config, &db_client, &publisher).await {
                warn!(
                    channel:% = notification.channel,
                    error:% = format!("{error:#}");
                    "cannot publish ledger event"
                );
            }
        }
    });

    let (bridge_result, publish_result) = tokio::join!(bridge_task, publish_task);
    publish_result.context("join publish task")?;
    bridge_result.context("join notification bridge task")??;

    bail!("notification bridge disconnected")
}

async fn publish<S, P>(
    notification: &Notification,
    config: Config,
    db_client: &DbClient<S>,
    publisher: &P,
) -> anyhow::Result<()>
where
    S: Storage,
    P: Publisher,
{
    let event = LedgerEvent::try_from(notification).context("decode ledger event")?;
    debug!(event:?; "publishing ledger event");

    match event {
        LedgerEvent::Epoch(epoch) => {
            info!(no = epoch.no; "epoch added");
            publisher
                .publish(&epoch)
                .await
                .context("publish EpochAdded")?;
        }

        LedgerEvent::Block(block) => {
            publisher
                .publish(&block)
                .await
                .context("publish BlockAdded")?;
        }

        LedgerEvent::Delegation(delegation) => {
            publisher
                .publish(&delegation)
                .await
                .context("publish DelegationAdded")?;
        }

        LedgerEvent::Transaction(transaction) => {
            publisher
                .publish(&transaction)
                .await
                .context("publish TransactionAdded")?;

            if config.fetch_payments {
                let outputs = db_client
                    .get_transaction_utxos_by_id(transaction.id)
                    .await
                    .with_context(|| format!("get outputs of transaction {}", transaction.id))?;

                publisher
                    .publish(&PaymentsReceived {
                        transaction,
                        outputs,
                    })
                    .await
                    .context("publish PaymentsReceived")?;
            }
        }
    }

    Ok(())
}

/// Log every ledger event published via the given subscriber at INFO. Subscribes before
/// returning, so no event published afterwards is missed. The returned future completes with the
/// number of events logged once all subscriptions have ended.
pub fn log_events<S>(subscriber: &S) -> impl Future<Output = usize> + Send + use<S>
where
    S: Subscriber,
{
    let epochs = subscriber.subscribe::<EpochAdded>();
    let blocks = subscriber.subscribe::<BlockAdded>();
    let delegations = subscriber.subscribe::<DelegationAdded>();
    let transactions = subscriber.subscribe::<TransactionAdded>();
    let payments = subscriber.subscribe::<PaymentsReceived>();

    async move {
        let (epochs, blocks, delegations, transactions, payments) = tokio::join!(
            log_messages(epochs),
            log_messages(blocks),
            log_messages(delegations),
            log_messages(transactions),
            log_messages(payments),
        );

        epochs + blocks + delegations + transactions + payments
    }
}

async fn log_messages<T, E>(messages: impl Stream<Item = Result<T, E>>) -> usize
where
    T: Message,
    E: StdError,
{
    let mut messages = pin!(messages);
    let mut count = 0;

    while let Some(message) = messages.next().await {
        match message {
            Ok(message) => {
                count += 1;
                info!(topic = T::TOPIC.0, message:?; "ledger event");
            }

            Err(error) => {
                warn!(topic = T::TOPIC.0, error:% = error.as_chain(); "cannot receive ledger event")
            }
        }
    }

    count
}

fn fetch_payments_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use crate::{
        application::{self, Config},
        domain::{
            BlockAdded, Bridge, DbClient, Listener, PaymentsReceived, RawNotification,
            TransactionAdded, UtxoAssetRow, storage::fake::FakeStorage,
        },
    };
    use assert_matches::assert_matches;
    use dbsync_common::{
        domain::{ByteArray, Publisher, Subscriber},
        infra::pub_sub::in_mem::InMemPubSub,
    };
    use futures::StreamExt;
    use serde_json::json;
    use std::{collections::VecDeque, convert::Infallible, time::Duration};
    use tokio::time::timeout;

    struct FakeListener(VecDeque<RawNotification>);

    impl Listener for FakeListener {
        type Error = Infallible;

        async fn listen(&mut self, _channels: &[String]) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<RawNotification>, Self::Error> {
            Ok(self.0.pop_front())
        }

        async fn close(&mut self) {}
    }

    fn notification(channel: &str, record: serde_json::Value) -> RawNotification {
        RawNotification {
            channel: channel.to_string(),
            payload: json!({ "record": record }).to_string(),
        }
    }

    #[tokio::test]
    async fn test_run() {
        let hash = "ab".repeat(32);
        let listener = FakeListener(VecDeque::from([
            notification("new_block", json!({ "id": 1 })),
            notification(
                "new_block",
                json!({
                    "id": 7, "hash": format!("\\x{hash}"), "epoch_no": 500, "slot_no": 1,
                    "epoch_slot_no": 1, "block_no": 10, "previous_id": 6, "slot_leader_id": 1,
                    "size": 4, "time": "2024-01-01T00:00:00", "tx_count": 1
                }),
            ),
            notification(
                "new_transaction",
                json!({
                    "id": 42, "hash": format!("\\x{hash}"), "block_id": 7, "block_index": 0,
                    "out_sum": 1000000, "fee": 170000, "deposit": 0, "size": 300,
                    "invalid_before": null, "invalid_hereafter": null, "valid_contract": true,
                    "script_size": 0
                }),
            ),
        ]));

        let storage = FakeStorage {
            utxo_rows: vec![UtxoAssetRow {
                tx_id: 42,
                address: "addr_test1vz".to_string(),
                hash: ByteArray([0xab; 32]),
                index: 0,
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
                policy_id: None,
                asset_name: None,
                quantity: None,
                fingerprint: None,
            }],
            ..Default::default()
        };

        let pub_sub = InMemPubSub::default();
        let subscriber = pub_sub.subscriber();
        let mut blocks = subscriber.subscribe::<BlockAdded>();
        let mut transactions = subscriber.subscribe::<TransactionAdded>();
        let mut payments = subscriber.subscribe::<PaymentsReceived>();

        let config = Config {
            fetch_payments: true,
        };
        let result = application::run(
            config,
            Bridge::new(listener),
            DbClient::new(storage),
            pub_sub.publisher(),
        )
        .await;
        assert!(result.is_err());

        // The malformed block is skipped.
        let block = timeout(Duration::from_secs(1), blocks.next()).await.unwrap();
        assert_matches!(block, Some(Ok(BlockAdded { id: 7, .. })));

        let transaction = timeout(Duration::from_secs(1), transactions.next())
            .await
            .unwrap();
        assert_matches!(transaction, Some(Ok(TransactionAdded { id: 42, .. })));

        let payment = timeout(Duration::from_secs(1), payments.next()).await.unwrap();
        assert_matches!(
            payment,
            Some(Ok(PaymentsReceived { transaction, outputs }))
                if transaction.id == 42 && outputs.len() == 1 && outputs[0].value == 1_000_000
        );
    }

    #[tokio::test]
    async fn test_log_events() {
        let pub_sub = InMemPubSub::default();
        let events = application::log_events(&pub_sub.subscriber());

        let publisher = pub_sub.publisher();
        let transaction = TransactionAdded {
            id: 42,
            hash: ByteArray([0xab; 32]),
            block_id: 7,
            block_index: 0,
            out_sum: 1_000_000,
            fee: 170_000,
            deposit: None,
            size: 300,
            invalid_before: None,
            invalid_hereafter: None,
            valid_contract: true,
            script_size: 0,
        };
        publisher.publish(&transaction).await.unwrap();
        publisher
            .publish(&PaymentsReceived {
                transaction,
                outputs: vec![],
            })
            .await
            .unwrap();

        // Dropping the last handle closes all subscriptions.
        drop(publisher);
        drop(pub_sub);

        let count = timeout(Duration::from_secs(1), events).await.unwrap();
        assert_eq!(count, 2);
    }
}
