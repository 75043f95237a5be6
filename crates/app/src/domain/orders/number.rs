//! Order numbers.
//!
//! Numbers look like `ORD-20261018093012-K7QX2MNP`: the UTC creation time
//! followed by a random suffix. Uniqueness is finally enforced by the
//! database; a collision is retried with a fresh number.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use mockall::automock;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

/// Prefix shared by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Length of the random suffix.
pub const ORDER_NUMBER_SUFFIX_LENGTH: usize = 8;

/// Characters used for the random suffix (no `0/O` or `1/I` lookalikes).
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const TIMESTAMP_LENGTH: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed order number '{0}'")]
pub struct InvalidOrderNumber(pub String);

/// Order Number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number from a creation time and suffix.
    #[must_use]
    pub fn from_parts(at: Timestamp, suffix: &str) -> Self {
        Self(format!(
            "{ORDER_NUMBER_PREFIX}-{}-{suffix}",
            at.strftime("%Y%m%d%H%M%S")
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_column(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidOrderNumber(value.to_string());

        let mut parts = value.split('-');

        let (Some(prefix), Some(stamp), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let well_formed = prefix == ORDER_NUMBER_PREFIX
            && stamp.len() == TIMESTAMP_LENGTH
            && stamp.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == ORDER_NUMBER_SUFFIX_LENGTH
            && suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b));

        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(invalid())
        }
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Source of candidate order numbers.
#[automock]
pub trait OrderNumbers: Send + Sync {
    fn generate(&self, now: Timestamp) -> OrderNumber;
}

/// Timestamp plus random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumbers;

impl OrderNumbers for RandomOrderNumbers {
    fn generate(&self, now: Timestamp) -> OrderNumber {
        let mut rng = rand::thread_rng();

        let suffix: String = std::iter::repeat_with(|| SUFFIX_ALPHABET.choose(&mut rng))
            .take(ORDER_NUMBER_SUFFIX_LENGTH)
            .flatten()
            .map(|&byte| char::from(byte))
            .collect();

        OrderNumber::from_parts(now, &suffix)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn generated_numbers_embed_the_timestamp() -> TestResult {
        let at: Timestamp = "2026-10-18T09:30:12Z".parse()?;

        let number = RandomOrderNumbers.generate(at);

        assert!(
            number.as_str().starts_with("ORD-20261018093012-"),
            "unexpected number {number}"
        );
        assert_eq!(number.as_str().parse::<OrderNumber>()?, number);

        Ok(())
    }

    #[test]
    fn generated_numbers_differ_within_the_same_second() {
        let now = Timestamp::now();

        assert_ne!(RandomOrderNumbers.generate(now), RandomOrderNumbers.generate(now));
    }

    #[test]
    fn parse_rejects_malformed_numbers() {
        for value in [
            "",
            "ORD",
            "ORD-20261018093012",
            "INV-20261018093012-ABCDEFGH",
            "ORD-2026101809301-ABCDEFGH",
            "ORD-20261018093012-ABCDEFG",
            "ORD-20261018093012-abcdefgh",
            "ORD-20261018093012-ABCDEFGH-X",
        ] {
            assert!(value.parse::<OrderNumber>().is_err(), "{value} should be rejected");
        }
    }
}
