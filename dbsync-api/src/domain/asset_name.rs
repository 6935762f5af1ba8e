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

//! Asset names and the CIP-68 labels which may prefix them.

use dbsync_common::domain::RawAssetName;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Prefix of reference tokens, label 100.
pub const REFERENCE_PREFIX: [u8; 4] = [0x00, 0x06, 0x43, 0xb0];

/// Prefix of NFT user tokens, label 222.
pub const NFT_PREFIX: [u8; 4] = [0x00, 0x0d, 0xe1, 0x40];

/// Prefix of fungible user tokens, label 333.
pub const FT_PREFIX: [u8; 4] = [0x00, 0x14, 0xde, 0x40];

/// CIP-68 asset name label.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Cip68Label {
    #[display("100")]
    Reference,

    #[display("222")]
    Nft,

    #[display("333")]
    Ft,
}

impl Cip68Label {
    /// The label of the given raw asset name, if prefixed by one of the known prefixes.
    pub fn of(name: &[u8]) -> Option<Self> {
        match name.get(..4)? {
            prefix if prefix == REFERENCE_PREFIX => Some(Self::Reference),
            prefix if prefix == NFT_PREFIX => Some(Self::Nft),
            prefix if prefix == FT_PREFIX => Some(Self::Ft),
            _ => None,
        }
    }

    pub fn prefix(self) -> [u8; 4] {
        match self {
            Self::Reference => REFERENCE_PREFIX,
            Self::Nft => NFT_PREFIX,
            Self::Ft => FT_PREFIX,
        }
    }

    pub fn value(self) -> u16 {
        match self {
            Self::Reference => 100,
            Self::Nft => 222,
            Self::Ft => 333,
        }
    }

    /// User tokens are those which get their metadata from a reference token.
    pub fn is_user_token(self) -> bool {
        self != Self::Reference
    }
}

impl From<Cip68Label> for u16 {
    fn from(label: Cip68Label) -> Self {
        label.value()
    }
}

impl TryFrom<u16> for Cip68Label {
    type Error = UnknownLabelError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(Self::Reference),
            222 => Ok(Self::Nft),
            333 => Ok(Self::Ft),
            other => Err(UnknownLabelError(other)),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown CIP-68 label {0}")]
pub struct UnknownLabelError(u16);

/// Whether the given raw asset name carries a CIP-68 label prefix.
pub fn is_cip68(name: &[u8]) -> bool {
    Cip68Label::of(name).is_some()
}

/// The given raw asset name without its CIP-68 label prefix, if any.
pub fn strip_label(name: &[u8]) -> &[u8] {
    match Cip68Label::of(name) {
        Some(_) => &name[4..],
        None => name,
    }
}

/// The name of the reference token for the given CIP-68 asset name: the label prefix is replaced
/// by the reference prefix, the remaining bytes are kept.
pub fn reference_name(name: &[u8]) -> Option<RawAssetName> {
    Cip68Label::of(name)?;

    let mut reference_name = REFERENCE_PREFIX.to_vec();
    reference_name.extend_from_slice(strip_label(name));
    Some(reference_name.into())
}

/// A displayable asset name with its CIP-68 label, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    pub name: String,
    pub label: Option<Cip68Label>,
}

impl AssetName {
    /// Strip the label prefix, if any, and decode the remainder as UTF-8. If that is invalid or
    /// not printable, the remainder is rendered as hex instead.
    pub fn decode(raw: &[u8]) -> Self {
        let label = Cip68Label::of(raw);
        let bytes = strip_label(raw);

        let name = match std::str::from_utf8(bytes) {
            Ok(name) if is_printable(name) => name.to_owned(),
            _ => const_hex::encode(bytes),
        };

        Self { name, label }
    }
}

/// Whether the given text has no control, unassigned or surrogate code points.
pub fn is_printable(text: &str) -> bool {
    !text.chars().any(|c| {
        matches!(
            get_general_category(c),
            GeneralCategory::Control | GeneralCategory::Unassigned | GeneralCategory::Surrogate
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::{
        AssetName, Cip68Label, FT_PREFIX, NFT_PREFIX, REFERENCE_PREFIX, is_cip68, is_printable,
        reference_name, strip_label,
    };

    fn prefixed(prefix: [u8; 4], name: &[u8]) -> Vec<u8> {
        [prefix.as_slice(), name].concat()
    }

    #[test]
    fn test_plain_name() {
        let raw = const_hex::decode("746573745F746F6B656E").unwrap();
        assert!(!is_cip68(&raw));
        assert_eq!(
            AssetName::decode(&raw),
            AssetName {
                name: "test_token".to_string(),
                label: None
            }
        );
    }

    #[test]
    fn test_cip68_name() {
        let raw = prefixed(REFERENCE_PREFIX, b"MyNFT");
        assert!(is_cip68(&raw));
        assert_eq!(
            AssetName::decode(&raw),
            AssetName {
                name: "MyNFT".to_string(),
                label: Some(Cip68Label::Reference)
            }
        );

        let raw = prefixed(FT_PREFIX, b"Coin");
        assert_eq!(AssetName::decode(&raw).label, Some(Cip68Label::Ft));
        assert_eq!(Cip68Label::Ft.value(), 333);
    }

    #[test]
    fn test_binary_name() {
        let raw = [0xff, 0x00, 0x01];
        assert_eq!(AssetName::decode(&raw).name, "ff0001");

        // Valid UTF-8, but with a control character.
        let raw = prefixed(NFT_PREFIX, b"a\x07b");
        assert_eq!(
            AssetName::decode(&raw),
            AssetName {
                name: "610762".to_string(),
                label: Some(Cip68Label::Nft)
            }
        );

        // Valid UTF-8, but U+0378 is unassigned.
        let raw = [b'a', 0xcd, 0xb8];
        assert_eq!(
            AssetName::decode(&raw),
            AssetName {
                name: "61cdb8".to_string(),
                label: None
            }
        );
        assert!(!is_printable("a\u{378}"));
        assert!(!is_printable("\u{e0080}"));

        assert!(is_printable("Spacebudz #1"));
        assert!(is_printable("トークン"));
        assert!(!is_printable("\u{fffe}"));
        assert!(!is_printable("\u{fdd0}"));

        assert_eq!(AssetName::decode(&[]).name, "");
    }

    #[test]
    fn test_round_trip() {
        let names: [&[u8]; 3] = [b"MyNFT", b"", &[0xde, 0xad]];
        for name in names {
            for prefix in [REFERENCE_PREFIX, NFT_PREFIX, FT_PREFIX] {
                let raw = prefixed(prefix, name);
                assert_eq!(strip_label(&raw), name);

                let reference = reference_name(&raw).unwrap();
                assert_eq!(reference.as_ref(), prefixed(REFERENCE_PREFIX, name).as_slice());
            }
        }

        assert_eq!(strip_label(b"MyNFT"), b"MyNFT");
        assert!(reference_name(b"MyNFT").is_none());
    }

    #[test]
    fn test_label_serde() {
        assert_eq!(serde_json::to_string(&Cip68Label::Nft).unwrap(), "222");
        assert!(serde_json::from_str::<Cip68Label>("100").is_ok());
        assert!(serde_json::from_str::<Cip68Label>("101").is_err());
    }
}
