//! Ware identifiers and the format rules new identifiers must satisfy.

use core::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a ware.
///
/// Unique among live wares and immutable once assigned. Construction through
/// [`WareId::new`] does not check the format; [`WareId::parse`] does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WareId(String);

impl WareId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse a user-supplied identifier, enforcing [`IdRules`].
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        IdRules::check(id).map_err(|violations| {
            let reasons: Vec<String> = violations.iter().map(ToString::to_string).collect();
            DomainError::invalid_id(format!("{id:?}: {}", reasons.join(" ")))
        })?;
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for WareId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WareId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for WareId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for WareId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Signs that count as "special" in an identifier.
pub const SPECIAL_SIGNS: &str = "_-=+.,";

pub const MIN_ID_LEN: usize = 6;
pub const MAX_ID_LEN: usize = 16;

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9]").expect("static regex"));
static LOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Ll}").expect("static regex"));
static UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{Lu}").expect("static regex"));
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-=+.,]").expect("static regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9 _\-=+.,]").expect("static regex"));

/// A single rule an identifier failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdViolation {
    Length,
    NoDigit,
    NoLowercase,
    NoUppercase,
    NoSpecial,
    InvalidCharacters,
}

impl core::fmt::Display for IdViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IdViolation::Length => {
                write!(f, "wrong length, min = {MIN_ID_LEN}, max = {MAX_ID_LEN}.")
            }
            IdViolation::NoDigit => f.write_str("no numbers."),
            IdViolation::NoLowercase => f.write_str("no lowercase letters."),
            IdViolation::NoUppercase => f.write_str("no uppercase letters."),
            IdViolation::NoSpecial => write!(f, "no special symbols: \"{SPECIAL_SIGNS}\"."),
            IdViolation::InvalidCharacters => f.write_str("contains invalid symbols or letters."),
        }
    }
}

/// Format rules for newly entered identifiers.
pub struct IdRules;

impl IdRules {
    /// Check every rule and report all violations together.
    pub fn check(id: &str) -> Result<(), Vec<IdViolation>> {
        let mut violations = Vec::new();

        let len = id.chars().count();
        if !(MIN_ID_LEN..=MAX_ID_LEN).contains(&len) {
            violations.push(IdViolation::Length);
        }
        if !DIGIT.is_match(id) {
            violations.push(IdViolation::NoDigit);
        }
        if !LOWER.is_match(id) {
            violations.push(IdViolation::NoLowercase);
        }
        if !UPPER.is_match(id) {
            violations.push(IdViolation::NoUppercase);
        }
        if !SPECIAL.is_match(id) {
            violations.push(IdViolation::NoSpecial);
        }
        if DISALLOWED.is_match(id) {
            violations.push(IdViolation::InvalidCharacters);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_stock_identifiers() {
        for id in ["ID-55t", "ID-123q", "ID-55t2", "ID-5q1", "ID-tv4", "ld-5wQ"] {
            assert_eq!(IdRules::check(id), Ok(()), "{id}");
        }
    }

    #[test]
    fn reports_every_violation() {
        let violations = IdRules::check("abc").unwrap_err();
        assert_eq!(
            violations,
            vec![
                IdViolation::Length,
                IdViolation::NoDigit,
                IdViolation::NoUppercase,
                IdViolation::NoSpecial,
            ]
        );
    }

    #[test]
    fn rejects_characters_outside_the_allowed_set() {
        let violations = IdRules::check("ID-55t#").unwrap_err();
        assert_eq!(violations, vec![IdViolation::InvalidCharacters]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(IdRules::check("Ab1-").unwrap_err().contains(&IdViolation::Length));
        assert!(IdRules::check("Ab1-aaaaaaaaaaaaa").unwrap_err().contains(&IdViolation::Length));
        assert_eq!(IdRules::check("Ab1-aaaaaaaaaaaa"), Ok(()));
    }

    #[test]
    fn parse_maps_violations_to_invalid_id() {
        match WareId::parse("short") {
            Err(DomainError::InvalidId(msg)) => assert!(msg.contains("wrong length")),
            other => panic!("expected InvalidId, got {other:?}"),
        }
        assert_eq!(WareId::parse("ID-55t").unwrap().as_str(), "ID-55t");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Any id built from one of each required class within bounds passes.
            #[test]
            fn well_formed_ids_pass(
                upper in "[A-Z]",
                lower in "[a-z]",
                digit in "[0-9]",
                special in "[-_=+.,]",
                filler in "[a-zA-Z0-9]{2,12}"
            ) {
                let id = format!("{upper}{special}{lower}{digit}{filler}");
                prop_assert_eq!(IdRules::check(&id), Ok(()));
            }
        }
    }
}
