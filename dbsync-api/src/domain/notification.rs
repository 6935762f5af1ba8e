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

//! Bridge from database change notifications to in-process subscribers. A [Bridge] keeps one
//! dedicated listening connection, decodes the JSON payloads and dispatches them to the handlers
//! registered in its [Registry] for the respective channel.

use dbsync_common::error::StdErrorExt;
use derive_more::Display;
use log::{debug, info, warn};
use metrics::{Counter, counter};
use parking_lot::RwLock;
use serde_json::Value;
use std::{collections::BTreeMap, error::Error as StdError, fmt, sync::Arc};
use thiserror::Error;
use tokio::sync::mpsc;

/// A change notification with its decoded JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub channel: String,
    pub payload: Value,
}

/// A change notification as received from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    pub channel: String,
    pub payload: String,
}

/// Receives the notifications of the channel it is subscribed to.
#[derive(Clone)]
pub enum Handler {
    Callback(Arc<dyn Fn(&Notification) + Send + Sync>),
    Queue(mpsc::UnboundedSender<Notification>),
}

impl Handler {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    pub fn queue(sender: mpsc::UnboundedSender<Notification>) -> Self {
        Self::Queue(sender)
    }

    fn handle(&self, notification: &Notification) {
        match self {
            Self::Callback(f) => f(notification),

            Self::Queue(sender) => {
                if sender.send(notification.clone()).is_err() {
                    debug!(channel:% = notification.channel; "queue closed, dropping notification");
                }
            }
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => write!(f, "Callback"),
            Self::Queue(_) => write!(f, "Queue"),
        }
    }
}

/// Identifies a subscription for unsubscribing.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Handlers by channel, shared between a [Bridge] and its users. Subscribing to a channel the
/// bridge is not yet listening on takes effect on the next [Bridge::connect].
#[derive(Debug, Clone, Default)]
pub struct Registry(Arc<RwLock<Subscriptions>>);

#[derive(Debug, Default)]
struct Subscriptions {
    next_id: u64,
    handlers: BTreeMap<String, Vec<(SubscriptionId, Handler)>>,
}

impl Registry {
    pub fn subscribe(&self, channel: impl Into<String>, handler: Handler) -> SubscriptionId {
        let mut subscriptions = self.0.write();

        let id = SubscriptionId(subscriptions.next_id);
        subscriptions.next_id += 1;
        subscriptions
            .handlers
            .entry(channel.into())
            .or_default()
            .push((id, handler));

        id
    }

    /// Remove the subscription with the given ID; returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.0.write();

        let mut removed = false;
        subscriptions.handlers.retain(|_, handlers| {
            let len = handlers.len();
            handlers.retain(|(handler_id, _)| *handler_id != id);
            removed |= handlers.len() < len;
            !handlers.is_empty()
        });

        removed
    }

    /// The channels with at least one subscription, sorted.
    pub fn channels(&self) -> Vec<String> {
        self.0.read().handlers.keys().cloned().collect()
    }

    /// Call every handler subscribed to the channel of the given notification, in order of
    /// subscription; returns the number of handlers called.
    pub fn dispatch(&self, notification: &Notification) -> usize {
        // Handlers are called without holding the lock, so they may (un)subscribe.
        let handlers = self
            .0
            .read()
            .handlers
            .get(&notification.channel)
            .map(|handlers| {
                handlers
                    .iter()
                    .map(|(_, handler)| handler.clone())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        for handler in &handlers {
            handler.handle(notification);
        }

        handlers.len()
    }
}

/// Connection state of a [Bridge].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    #[display("disconnected")]
    Disconnected,

    #[display("subscribing")]
    Subscribing,

    #[display("listening")]
    Listening,
}

/// A source of change notifications on a dedicated connection.
#[trait_variant::make(Send)]
pub trait Listener
where
    Self: Send + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// Open a connection and subscribe to the given channels.
    async fn listen(&mut self, channels: &[String]) -> Result<(), Self::Error>;

    /// Receive the next notification; `None` once the connection is lost, after which
    /// [Listener::listen] has to be called again.
    async fn recv(&mut self) -> Result<Option<RawNotification>, Self::Error>;

    /// Close the connection, if any.
    async fn close(&mut self);
}

/// Delivers the notifications of a [Listener] to the handlers of its [Registry].
pub struct Bridge<L> {
    listener: L,
    registry: Registry,
    state: BridgeState,
    metrics: Metrics,
}

impl<L> Bridge<L>
where
    L: Listener,
{
    pub fn new(listener: L) -> Self {
        Self {
            listener,
            registry: Registry::default(),
            state: BridgeState::Disconnected,
            metrics: Metrics::default(),
        }
    }

    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    pub fn subscribe(&self, channel: impl Into<String>, handler: Handler) -> SubscriptionId {
        self.registry.subscribe(channel, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Listen on all channels of the registry; a no-op if already listening.
    pub async fn connect(&mut self) -> Result<(), BridgeError<L::Error>> {
        if self.state == BridgeState::Listening {
            return Ok(());
        }

        self.state = BridgeState::Subscribing;
        let channels = self.registry.channels();

        match self.listener.listen(&channels).await {
            Ok(()) => {
                self.state = BridgeState::Listening;
                info!(channels:?; "listening for notifications");
                Ok(())
            }

            Err(error) => {
                self.state = BridgeState::Disconnected;
                Err(BridgeError::Listen(error))
            }
        }
    }

    /// Deliver notifications until the connection is lost. Returns `Ok` if the connection was
    /// closed and an error if receiving failed; either way the bridge ends up disconnected and
    /// stays so until [Bridge::connect] is called again.
    pub async fn run(&mut self) -> Result<(), BridgeError<L::Error>> {
        if self.state != BridgeState::Listening {
            return Err(BridgeError::NotListening(self.state));
        }

        loop {
            match self.listener.recv().await {
                Ok(Some(notification)) => self.deliver(notification),

                Ok(None) => {
                    self.state = BridgeState::Disconnected;
                    warn!("notification connection closed");
                    return Ok(());
                }

                Err(error) => {
                    self.state = BridgeState::Disconnected;
                    self.listener.close().await;
                    return Err(BridgeError::Listen(error));
                }
            }
        }
    }

    pub async fn disconnect(&mut self) {
        self.listener.close().await;
        self.state = BridgeState::Disconnected;
    }

    fn deliver(&self, notification: RawNotification) {
        self.metrics.received.increment(1);

        let RawNotification { channel, payload } = notification;
        match serde_json::from_str::<Value>(&payload) {
            Ok(payload) => {
                let notification = Notification { channel, payload };
                let count = self.registry.dispatch(&notification);
                self.metrics.dispatched.increment(count as u64);
            }

            Err(error) => {
                self.metrics.dropped.increment(1);
                warn!(channel:%, error:% = error.as_chain(); "dropping malformed notification");
            }
        }
    }
}

impl<L> fmt::Debug for Bridge<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("registry", &self.registry)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum BridgeError<E>
where
    E: StdError + 'static,
{
    #[error("cannot receive notifications")]
    Listen(#[source] E),

    #[error("bridge is {0}, not listening")]
    NotListening(BridgeState),
}

struct Metrics {
    received: Counter,
    dispatched: Counter,
    dropped: Counter,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            received: counter!("dbsync_notifications_received"),
            dispatched: counter!("dbsync_notifications_dispatched"),
            dropped: counter!("dbsync_notifications_dropped"),
        }
    }
}
