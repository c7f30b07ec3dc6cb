//! Identifiers and numeric aliases shared by every Furrow crate.
//!
//! Accounts and assets are both 20-byte addresses rendered as `0x`-prefixed
//! lowercase hex. Amounts are `u128` base units.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Token amount in base units.
pub type Amount = u128;

/// Pool weight. Only the ratio to the total weight matters.
pub type Weight = u128;

/// Externally supplied block number. Monotonically non-decreasing.
pub type BlockNumber = u64;

/// A 20-byte account or contract address.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Never a valid administrator or custody account.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Check if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let array: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Identifier of a fungible asset: the address of its token contract.
///
/// Each pool is keyed by the asset it accepts as stake.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct AssetId(pub Address);

impl AssetId {
    /// Wrap a token contract address.
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// The token contract address.
    pub fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AssetId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Serde adapter for [`Amount`] values that may arrive as integers or
/// decimal strings.
///
/// Configuration sources (TOML, environment) cannot carry integers above
/// `i64::MAX`, so large amounts are written as strings. Serializes as a
/// decimal string.
pub mod amount_serde {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer or decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("negative amount: {v}")))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("negative amount: {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.trim()
                .replace('_', "")
                .parse()
                .map_err(|_| E::custom(format!("invalid amount: {v:?}")))
        }
    }
}
