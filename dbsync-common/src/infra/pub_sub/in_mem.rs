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

pub mod publisher;
pub mod subscriber;

use crate::{
    domain::Topic,
    infra::pub_sub::in_mem::{publisher::InMemPublisher, subscriber::InMemSubscriber},
};
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::broadcast::{self, Sender};

const CAPACITY: usize = 1_024;

/// Factory for in memory based implementations for publishers and subscribers. Each topic gets
/// its own broadcast channel, created on first use.
#[derive(Clone, Default)]
pub struct InMemPubSub {
    senders: Arc<Mutex<HashMap<Topic, Sender<Value>>>>,
}

impl InMemPubSub {
    /// Factory for [InMemPublisher].
    pub fn publisher(&self) -> InMemPublisher {
        InMemPublisher::new(self.clone())
    }

    /// Factory for [InMemSubscriber].
    pub fn subscriber(&self) -> InMemSubscriber {
        InMemSubscriber::new(self.clone())
    }

    fn sender(&self, topic: Topic) -> Sender<Value> {
        self.senders
            .lock()
            .entry(topic)
            .or_insert_with(|| broadcast::channel(CAPACITY).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{Publisher, Subscriber},
        infra::pub_sub::in_mem::InMemPubSub,
        message,
    };
    use assert_matches::assert_matches;
    use futures::StreamExt;
    use serde::{Deserialize, Serialize};
    use std::error::Error as StdError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct EpochStarted {
        no: u32,
    }
    message!(EpochStarted);

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct BlockSeen {
        block_no: u64,
    }
    message!(BlockSeen);

    #[tokio::test]
    async fn test_publish_subscribe() -> Result<(), Box<dyn StdError>> {
        let pub_sub = InMemPubSub::default();

        // Without subscribers messages are discarded.
        pub_sub.publisher().publish(&BlockSeen { block_no: 1 }).await?;

        let subscriber = pub_sub.subscriber();
        let mut epochs = subscriber.subscribe::<EpochStarted>();
        let mut blocks = subscriber.subscribe::<BlockSeen>();

        pub_sub.publisher().publish(&BlockSeen { block_no: 2 }).await?;
        pub_sub.publisher().publish(&EpochStarted { no: 500 }).await?;

        let message = epochs.next().await;
        assert_matches!(message, Some(Ok(EpochStarted { no: 500 })));

        let message = blocks.next().await;
        assert_matches!(message, Some(Ok(BlockSeen { block_no: 2 })));

        Ok(())
    }
}
