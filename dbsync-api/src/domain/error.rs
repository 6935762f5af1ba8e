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

use crate::domain::{InvalidIdentifierError, InvalidPageSizeError};
use thiserror::Error;

/// Errors of [DbClient](crate::domain::DbClient) queries. Nothing found is not an error, but
/// `None` or an empty list.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid identifier")]
    InvalidIdentifier(#[from] InvalidIdentifierError),

    #[error(transparent)]
    InvalidPageSize(#[from] InvalidPageSizeError),

    #[error("query failed")]
    QueryFailed(#[from] sqlx::Error),

    #[error("client is disconnected")]
    Disconnected,
}
