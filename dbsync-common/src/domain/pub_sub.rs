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

use futures::Stream;
use serde::{Deserialize, Serialize};
use std::{error::Error as StdError, fmt::Debug};

/// Implement [Message] for the given type, using its name as [Topic].
#[macro_export]
macro_rules! message {
    ($name:ident) => {
        impl $crate::domain::Message for $name {
            const TOPIC: $crate::domain::Topic = $crate::domain::Topic(stringify!($name));
        }
    };
}

/// A pub-sub message, e.g. a ledger event derived from a change notification.
pub trait Message
where
    Self: Debug + Clone + PartialEq + Serialize + for<'de> Deserialize<'de> + Send + Sync,
{
    const TOPIC: Topic;
}

/// The topic a [Message] is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic(pub &'static str);

/// A pub-sub publisher.
#[trait_variant::make(Send)]
pub trait Publisher
where
    Self: Clone + Send + Sync + 'static,
{
    /// Error type for the [Publisher::publish] method.
    type Error: StdError + Send + Sync + 'static;

    /// Publish the given message.
    async fn publish<T>(&self, message: &T) -> Result<(), Self::Error>
    where
        T: Message;
}

/// A pub-sub subscriber.
pub trait Subscriber
where
    Self: Clone + Send + Sync + 'static,
{
    /// Error type for the items of the stream returned by [Subscriber::subscribe].
    type Error: StdError + Send + Sync + 'static;

    /// Subscribe to the messages of type `T`. Only messages published after subscribing are
    /// received.
    fn subscribe<T>(&self) -> impl Stream<Item = Result<T, Self::Error>> + Send + 'static + use<Self, T>
    where
        T: Message + 'static;
}
