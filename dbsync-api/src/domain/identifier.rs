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
use dbsync_common::domain::{ByteArray, ByteVec, PolicyId, PoolHash, RawAssetName};
use derive_more::Display;
use std::str::FromStr;
use thiserror::Error;

const POLICY_ID_LEN: usize = 28;
const ASSET_NAME_MAX_LEN: usize = 32;

/// The kinds of bech32 encoded identifiers, recognized by their prefix.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bech32Kind {
    #[display("pool")]
    Pool,

    #[display("asset")]
    Asset,

    #[display("address")]
    Address,

    #[display("stake address")]
    Stake,
}

impl Bech32Kind {
    const ALL: [Self; 4] = [Self::Pool, Self::Asset, Self::Address, Self::Stake];

    /// The prefix by which this kind is recognized.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Pool => "pool1",
            Self::Asset => "asset1",
            Self::Address => "addr",
            Self::Stake => "stake",
        }
    }

    /// The kind of the given string by prefix, if any.
    pub fn of(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| s.starts_with(kind.prefix()))
    }

    fn accepts_hrp(self, hrp: &str) -> bool {
        match self {
            Self::Pool => hrp == "pool",
            Self::Asset => hrp == "asset",
            Self::Address => hrp == "addr" || hrp == "addr_test",
            Self::Stake => hrp == "stake" || hrp == "stake_test",
        }
    }
}

/// A polymorphic identifier as accepted by singleton lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// A surrogate ID.
    Numeric(u64),

    /// A bech32 encoded identifier, validated against its human-readable part.
    Bech32 {
        kind: Bech32Kind,
        encoded: String,
        data: Vec<u8>,
    },

    /// Raw bytes, e.g. a hash.
    Hex(ByteVec),
}

impl Identifier {
    /// Disambiguate the given string: all digits fitting into `u64` make a numeric ID, a known
    /// bech32 prefix makes a bech32 identifier, anything else must be hex.
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidIdentifierError::Empty);
        }

        // All digits overflowing u64 cannot be an ID, hence are treated as hex.
        if s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = s.parse::<u64>() {
                return Ok(Self::Numeric(id));
            }
        }

        if let Some(kind) = Bech32Kind::of(s) {
            let (hrp, data) = bech32::decode(s)
                .map_err(|error| InvalidIdentifierError::Bech32(s.to_owned(), error))?;
            if !kind.accepts_hrp(hrp.as_str()) {
                return Err(InvalidIdentifierError::Hrp {
                    kind,
                    hrp: hrp.to_string(),
                });
            }

            return Ok(Self::Bech32 {
                kind,
                encoded: s.to_lowercase(),
                data,
            });
        }

        let bytes = s
            .parse::<ByteVec>()
            .map_err(|error| InvalidIdentifierError::Hex(s.to_owned(), error))?;
        Ok(Self::Hex(bytes))
    }

    /// A short name of the kind of this identifier, e.g. for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric ID",
            Self::Bech32 { kind, .. } => match kind {
                Bech32Kind::Pool => "pool ID",
                Bech32Kind::Asset => "asset fingerprint",
                Bech32Kind::Address => "address",
                Bech32Kind::Stake => "stake address",
            },
            Self::Hex(_) => "hex",
        }
    }

    /// Interpret this identifier as either a surrogate ID or a hash of `N` bytes.
    pub fn into_id_or_hash<const N: usize>(
        self,
    ) -> Result<IdOrHash<ByteArray<N>>, InvalidIdentifierError> {
        match self {
            Self::Numeric(id) => Ok(IdOrHash::Id(id)),
            Self::Hex(bytes) => hash(bytes).map(IdOrHash::Hash),
            other => Err(other.unexpected("numeric ID or hex hash")),
        }
    }

    /// Interpret this identifier as a hash of `N` bytes.
    pub fn into_hash<const N: usize>(self) -> Result<ByteArray<N>, InvalidIdentifierError> {
        match self {
            Self::Hex(bytes) => hash(bytes),
            other => Err(other.unexpected("hex hash")),
        }
    }

    /// Interpret this identifier as a bech32 identifier of the given kind.
    pub fn into_bech32(self, expected: Bech32Kind) -> Result<String, InvalidIdentifierError> {
        match self {
            Self::Bech32 { kind, encoded, .. } if kind == expected => Ok(encoded),
            other => Err(other.unexpected(expected.prefix())),
        }
    }

    fn unexpected(&self, expected: &'static str) -> InvalidIdentifierError {
        InvalidIdentifierError::UnexpectedKind {
            expected,
            found: self.kind_name(),
        }
    }
}

impl FromStr for Identifier {
    type Err = InvalidIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Either a surrogate ID or a hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdOrHash<H> {
    Id(u64),
    Hash(H),
}

/// Identifies an asset class either by policy ID and asset name or by fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetIdentifier {
    Unit {
        policy_id: PolicyId,
        name: RawAssetName,
    },
    Fingerprint(String),
}

impl TryFrom<Identifier> for AssetIdentifier {
    type Error = InvalidIdentifierError;

    /// Hex is split into the policy ID (the first 28 bytes) and the asset name (the rest).
    fn try_from(identifier: Identifier) -> Result<Self, Self::Error> {
        match identifier {
            Identifier::Hex(bytes) => {
                let len = bytes.len();
                if !(POLICY_ID_LEN..=POLICY_ID_LEN + ASSET_NAME_MAX_LEN).contains(&len) {
                    return Err(InvalidIdentifierError::Length {
                        expected: POLICY_ID_LEN,
                        found: len,
                    });
                }

                let (policy_id, name) = bytes.as_ref().split_at(POLICY_ID_LEN);
                let policy_id = PolicyId::try_from(policy_id).map_err(|_| {
                    InvalidIdentifierError::Length {
                        expected: POLICY_ID_LEN,
                        found: len,
                    }
                })?;

                Ok(Self::Unit {
                    policy_id,
                    name: name.into(),
                })
            }

            identifier => identifier
                .into_bech32(Bech32Kind::Asset)
                .map(Self::Fingerprint),
        }
    }
}

/// Identifies a stake pool either by its bech32 view or by its raw hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolIdentifier {
    View(String),
    Hash(PoolHash),
}

impl TryFrom<Identifier> for PoolIdentifier {
    type Error = InvalidIdentifierError;

    fn try_from(identifier: Identifier) -> Result<Self, Self::Error> {
        match identifier {
            Identifier::Hex(bytes) => hash(bytes).map(Self::Hash),
            identifier => identifier.into_bech32(Bech32Kind::Pool).map(Self::View),
        }
    }
}

/// Validate the given payment address: bech32 addresses must carry a valid checksum, other
/// bech32 kinds are rejected and anything else, e.g. a base58 Byron address, is passed through.
pub fn parse_address(s: &str) -> Result<String, InvalidIdentifierError> {
    let s = s.trim();

    match Bech32Kind::of(s) {
        Some(_) => Identifier::parse(s)?.into_bech32(Bech32Kind::Address),
        None if s.is_empty() => Err(InvalidIdentifierError::Empty),
        None => Ok(s.to_owned()),
    }
}

/// Validate the given stake address.
pub fn parse_stake_address(s: &str) -> Result<String, InvalidIdentifierError> {
    Identifier::parse(s)?.into_bech32(Bech32Kind::Stake)
}

fn hash<const N: usize>(bytes: ByteVec) -> Result<ByteArray<N>, InvalidIdentifierError> {
    let found = bytes.len();
    ByteArray::try_from(bytes.0)
        .map_err(|_| InvalidIdentifierError::Length { expected: N, found })
}

#[derive(Debug, Error)]
pub enum InvalidIdentifierError {
    #[error("identifier must not be empty")]
    Empty,

    #[error("cannot bech32-decode {0}")]
    Bech32(String, #[source] bech32::DecodeError),

    #[error("unexpected human-readable part {hrp} for {kind}")]
    Hrp { kind: Bech32Kind, hrp: String },

    #[error("cannot hex-decode {0}")]
    Hex(String, #[source] FromHexError),

    #[error("expected {expected}, but got {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected {expected} bytes, but got {found}")]
    Length { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        AssetIdentifier, Bech32Kind, IdOrHash, Identifier, InvalidIdentifierError,
        PoolIdentifier, parse_address, parse_stake_address,
    };
    use assert_matches::assert_matches;
    use bech32::{Bech32, Hrp};
    use dbsync_common::domain::{BlockHash, ByteVec};

    fn encode(hrp: &str, data: &[u8]) -> String {
        bech32::encode::<Bech32>(Hrp::parse(hrp).unwrap(), data).unwrap()
    }

    #[test]
    fn test_numeric_first() {
        assert_matches!(Identifier::parse("351576"), Ok(Identifier::Numeric(351576)));
        assert_matches!(Identifier::parse(" 42 "), Ok(Identifier::Numeric(42)));

        // Overflowing u64, hence hex.
        let identifier = Identifier::parse("123456789012345678901234");
        assert_matches!(identifier, Ok(Identifier::Hex(bytes)) if bytes.len() == 12);
    }

    #[test]
    fn test_bech32() {
        let pool_id = encode("pool", &[1; 28]);
        let identifier = Identifier::parse(&pool_id).unwrap();
        assert_matches!(
            &identifier,
            Identifier::Bech32 { kind: Bech32Kind::Pool, encoded, data }
                if *encoded == pool_id && data.len() == 28
        );
        assert_matches!(
            PoolIdentifier::try_from(identifier),
            Ok(PoolIdentifier::View(view)) if view == pool_id
        );

        let fingerprint = encode("asset", &[7; 20]);
        assert_matches!(
            AssetIdentifier::try_from(Identifier::parse(&fingerprint).unwrap()),
            Ok(AssetIdentifier::Fingerprint(f)) if f == fingerprint
        );

        let stake_address = encode("stake_test", &[0xe0; 29]);
        assert_matches!(parse_stake_address(&stake_address), Ok(s) if s == stake_address);

        // A broken checksum.
        let mut broken = encode("addr", &[0x01; 57]);
        let last = broken.pop().unwrap();
        broken.push(if last == 'q' { 'p' } else { 'q' });
        assert_matches!(
            Identifier::parse(&broken),
            Err(InvalidIdentifierError::Bech32(..))
        );

        // A known prefix with a foreign human-readable part.
        assert_matches!(
            Identifier::parse(&encode("stake_vk", &[1; 32])),
            Err(InvalidIdentifierError::Hrp { kind: Bech32Kind::Stake, .. })
        );
    }

    #[test]
    fn test_hex() {
        let identifier = Identifier::parse("746573745F746F6B656E");
        assert_matches!(
            identifier,
            Ok(Identifier::Hex(bytes)) if bytes == ByteVec(b"test_token".to_vec())
        );

        assert_matches!(
            Identifier::parse("not hex"),
            Err(InvalidIdentifierError::Hex(..))
        );
        assert_matches!(Identifier::parse("abc"), Err(InvalidIdentifierError::Hex(..)));
        assert_matches!(Identifier::parse(""), Err(InvalidIdentifierError::Empty));
    }

    #[test]
    fn test_id_or_hash() {
        let id_or_hash = Identifier::parse("1").unwrap().into_id_or_hash::<32>();
        assert_matches!(id_or_hash, Ok(IdOrHash::Id(1)));

        let hash = "ab".repeat(32);
        let id_or_hash = Identifier::parse(&hash).unwrap().into_id_or_hash::<32>();
        assert_matches!(id_or_hash, Ok(IdOrHash::Hash(h)) if h == hash.parse::<BlockHash>().unwrap());

        let id_or_hash = Identifier::parse("abcd").unwrap().into_id_or_hash::<32>();
        assert_matches!(
            id_or_hash,
            Err(InvalidIdentifierError::Length { expected: 32, found: 2 })
        );

        let id_or_hash = Identifier::parse(&encode("pool", &[1; 28]))
            .unwrap()
            .into_id_or_hash::<32>();
        assert_matches!(id_or_hash, Err(InvalidIdentifierError::UnexpectedKind { .. }));
    }

    #[test]
    fn test_asset_unit() {
        let policy_id = "b3fd2e8b5764818d9b33e2bc8d9e84a61fa39e75cf0c41393ee6c7a9";
        let unit = format!("{policy_id}000de1404d794e4654");

        let identifier = AssetIdentifier::try_from(Identifier::parse(&unit).unwrap());
        assert_matches!(
            identifier,
            Ok(AssetIdentifier::Unit { policy_id: p, name })
                if p.to_string() == policy_id && name.as_ref() == b"\x00\x0d\xe1\x40MyNFT"
        );

        // A policy ID without asset name is a valid unit.
        let identifier = AssetIdentifier::try_from(Identifier::parse(policy_id).unwrap());
        assert_matches!(identifier, Ok(AssetIdentifier::Unit { name, .. }) if name.is_empty());

        let identifier = AssetIdentifier::try_from(Identifier::parse("abcd").unwrap());
        assert_matches!(identifier, Err(InvalidIdentifierError::Length { .. }));

        let identifier = AssetIdentifier::try_from(Identifier::Numeric(7));
        assert_matches!(identifier, Err(InvalidIdentifierError::UnexpectedKind { .. }));
    }

    #[test]
    fn test_parse_address() {
        let address = encode("addr_test", &[0x60; 29]);
        assert_matches!(parse_address(&address), Ok(a) if a == address);

        let byron = "Ae2tdPwUPEZFRbyhz3cpfC2CumGzNkFBN2L42rcUc2yjQpEkxDbkPodpMAi";
        assert_matches!(parse_address(byron), Ok(a) if a == byron);

        assert_matches!(
            parse_address(&encode("pool", &[1; 28])),
            Err(InvalidIdentifierError::UnexpectedKind { .. })
        );
        assert_matches!(parse_address("  "), Err(InvalidIdentifierError::Empty));
    }
}
