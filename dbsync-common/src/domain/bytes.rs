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

use const_hex::FromHexError;
use derive_more::{AsRef, From, Into};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use sqlx::Type;
use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};
use thiserror::Error;

/// A newtype for a byte vector, e.g. an asset name or a raw datum, implementing amongst others
/// `Debug` and `Display` as hex; the former is cut after eight characters.
#[derive(Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, AsRef, From, Into, Type)]
#[as_ref([u8])]
#[from(Vec<u8>, &[u8])]
#[sqlx(transparent)]
pub struct ByteVec(pub Vec<u8>);

impl ByteVec {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for ByteVec {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const_hex::decode(s).map(Self)
    }
}

impl Debug for ByteVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug(self, f)
    }
}

impl Display for ByteVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f)
    }
}

/// A newtype for a fixed size byte array, e.g. a hash, implementing amongst others `Debug` and
/// `Display` as hex; the former is cut after eight characters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, AsRef, From, Into, Type)]
#[as_ref([u8])]
#[sqlx(transparent)]
pub struct ByteArray<const N: usize>(pub [u8; N]);

impl<const N: usize> Default for ByteArray<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> TryFrom<&[u8]> for ByteArray<N> {
    type Error = TryFromForByteArrayError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        bytes
            .try_into()
            .map_err(|_| TryFromForByteArrayError(N, bytes.len()))
            .map(Self)
    }
}

impl<const N: usize> TryFrom<Vec<u8>> for ByteArray<N> {
    type Error = TryFromForByteArrayError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        bytes.as_slice().try_into()
    }
}

impl<const N: usize> FromStr for ByteArray<N> {
    type Err = ParseByteArrayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = const_hex::decode(s)?;
        let bytes = bytes.try_into()?;
        Ok(bytes)
    }
}

impl<const N: usize> Debug for ByteArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug(self, f)
    }
}

impl<const N: usize> Display for ByteArray<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display(self, f)
    }
}

impl Serialize for ByteVec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ByteVec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl<const N: usize> Serialize for ByteArray<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, const N: usize> Deserialize<'de> for ByteArray<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[derive(Debug, Error)]
#[error("cannot create array of len {0} from slice of len {1}")]
pub struct TryFromForByteArrayError(usize, usize);

#[derive(Debug, Error)]
pub enum ParseByteArrayError {
    #[error("cannot hex-decode")]
    Hex(#[from] FromHexError),

    #[error(transparent)]
    Len(#[from] TryFromForByteArrayError),
}

fn debug<T>(bytes: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: AsRef<[u8]>,
{
    let hex_encoded = const_hex::encode(bytes);

    if hex_encoded.len() <= 8 {
        write!(f, "{hex_encoded}")
    } else {
        write!(f, "{}…", &hex_encoded[0..8])
    }
}

fn display<T>(bytes: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    T: AsRef<[u8]>,
{
    write!(f, "{}", const_hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use crate::domain::{ByteArray, ByteVec, PolicyId};
    use assert_matches::assert_matches;

    #[test]
    fn test_byte_vec() {
        let name = "746573745f746f6b656e".parse::<ByteVec>().unwrap();
        assert_eq!(name.as_ref(), b"test_token");
        assert_eq!(format!("{name:?}"), "74657374…");
        assert_eq!(format!("{name}"), "746573745f746f6b656e");

        let name = "7465".parse::<ByteVec>().unwrap();
        assert_eq!(format!("{name:?}"), "7465");

        assert!("xyz".parse::<ByteVec>().is_err());
    }

    #[test]
    fn test_byte_array() {
        let policy_id = "b3fd2e8b5764818d9b33e2bc8d9e84a61fa39e75cf0c41393ee6c7a9"
            .parse::<PolicyId>()
            .unwrap();
        assert_eq!(policy_id.0[0], 0xb3);
        assert_eq!(
            serde_json::to_string(&policy_id).unwrap(),
            "\"b3fd2e8b5764818d9b33e2bc8d9e84a61fa39e75cf0c41393ee6c7a9\""
        );

        assert_matches!("00ff".parse::<ByteArray<3>>(), Err(_));
        assert_matches!("0000ff".parse::<ByteArray<3>>(), Ok(ByteArray([0, 0, 255])));
    }
}
