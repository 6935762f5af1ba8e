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

use std::error::Error as StdError;

/// Extension methods for types implementing `std::error::Error`.
pub trait StdErrorExt
where
    Self: StdError,
{
    /// Render this error and all of its recursive sources as one colon separated string.
    ///
    /// Degraded paths which log instead of propagating use it like this:
    ///
    /// `warn!(channel, error:% = error.as_chain(); "dropping notification");`
    fn as_chain(&self) -> String {
        let mut chain = vec![self.to_string()];

        let mut source = self.source();
        while let Some(s) = source {
            chain.push(s.to_string());
            source = s.source();
        }

        chain.join(": ")
    }
}

impl<T> StdErrorExt for T where T: StdError {}

#[cfg(test)]
mod tests {
    use crate::error::StdErrorExt;
    use thiserror::Error;

    #[test]
    fn test_as_chain() {
        let error = serde_json::from_str::<serde_json::Value>("{not json")
            .map_err(Outer::from)
            .unwrap_err();
        assert!(error.as_chain().starts_with("cannot parse payload: key must be a string"));

        let error = Leaf;
        assert_eq!(error.as_chain(), "leaf");
    }

    #[derive(Debug, Error)]
    #[error("cannot parse payload")]
    struct Outer(#[from] serde_json::Error);

    #[derive(Debug, Error)]
    #[error("leaf")]
    struct Leaf;
}
