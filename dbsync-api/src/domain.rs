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

pub mod storage;

mod asset;
mod asset_name;
mod block;
mod db_client;
mod epoch;
mod error;
mod identifier;
mod ledger;
mod metadata;
mod notification;
mod pagination;
mod pool;
mod script;
mod stake;
mod transaction;
mod utxo;

pub use asset::*;
pub use asset_name::*;
pub use block::*;
pub use db_client::*;
pub use epoch::*;
pub use error::*;
pub use identifier::*;
pub use ledger::*;
pub use metadata::*;
pub use notification::*;
pub use pagination::*;
pub use pool::*;
pub use script::*;
pub use stake::*;
pub use transaction::*;
pub use utxo::*;
