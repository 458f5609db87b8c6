//! CNPJ normalization, check-digit validation and deduplication.
//!
//! A raw identifier is reduced to its ASCII digits, which must be exactly
//! fourteen and carry two valid modulo-11 check digits. Deduplication keeps
//! the first occurrence of every key and preserves input order.

use crate::constants::{CNPJ_LENGTH, FIRST_CHECK_WEIGHTS, SECOND_CHECK_WEIGHTS};
use crate::models::FailureKind;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

/// A checksum-valid, 14-digit CNPJ
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cnpj(String);

/// Why a raw identifier could not be normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("expected 14 digits, found {} in '{digits}'", .digits.len())]
    InvalidFormat { digits: String },

    #[error("check digits do not match for {cnpj}")]
    InvalidChecksum { cnpj: String },
}

impl NormalizeError {
    /// Row-level failure kind for this error
    pub fn kind(&self) -> FailureKind {
        match self {
            NormalizeError::InvalidFormat { .. } => FailureKind::InvalidFormat,
            NormalizeError::InvalidChecksum { .. } => FailureKind::InvalidChecksum,
        }
    }
}

impl Cnpj {
    /// Normalize and validate a raw identifier
    pub fn parse(raw: &str) -> Result<Self, NormalizeError> {
        normalize(raw)
    }

    /// The bare 14 digits
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as `NN.NNN.NNN/NNNN-NN`
    pub fn formatted(&self) -> String {
        let d = &self.0;
        format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        )
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cnpj {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

impl AsRef<str> for Cnpj {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Keep only the ASCII digits of a raw identifier
pub fn strip_formatting(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strip formatting and validate length and check digits
pub fn normalize(raw: &str) -> Result<Cnpj, NormalizeError> {
    let digits = strip_formatting(raw);

    if digits.len() != CNPJ_LENGTH {
        return Err(NormalizeError::InvalidFormat { digits });
    }

    if !has_valid_check_digits(&digits) {
        return Err(NormalizeError::InvalidChecksum { cnpj: digits });
    }

    Ok(Cnpj(digits))
}

/// Check both trailing digits of a 14-digit string
///
/// Strings made of a single repeated digit are rejected outright: the
/// registry never issues them, yet some satisfy the arithmetic.
fn has_valid_check_digits(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if values.len() != CNPJ_LENGTH {
        return false;
    }

    if values.iter().all(|&v| v == values[0]) {
        return false;
    }

    let first = check_digit(&values[..12], &FIRST_CHECK_WEIGHTS);
    let second = check_digit(&values[..13], &SECOND_CHECK_WEIGHTS);

    values[12] == first && values[13] == second
}

/// Weighted modulo-11 check digit
fn check_digit(values: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

/// Remove later duplicates, keeping first-seen order
///
/// Returns the surviving items and how many were dropped.
pub fn deduplicate<T, K, F>(items: Vec<T>, key: F) -> (Vec<T>, usize)
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    let original = items.len();

    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect();

    let removed = original - kept.len();
    (kept, removed)
}
