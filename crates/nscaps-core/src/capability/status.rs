//! Parsing of `/proc/<pid>/status` records.
//!
//! Only two records matter: `CapEff:` with the effective capability
//! bitmask, and `Uid:` with the effective UID as its second value. Parsing
//! never fails; anything unusable yields an empty or unknown result.

use nscaps_common::constants::{CAP_EFF_KEY, UID_KEY};
use nscaps_common::types::Uid;

/// Hex digits per 32-bit capability word.
const WORD_DIGITS: usize = 8;

/// The capability-related contents of a process status record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Effective capability words, least significant word first.
    pub effective: Vec<u32>,
    /// Effective UID, if the `Uid:` record was present and well-formed.
    pub euid: Option<Uid>,
}

impl ProcessStatus {
    /// Parses a complete status text.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        Self {
            effective: effective_caps(status),
            euid: effective_uid(status),
        }
    }
}

/// Returns the value part of the record starting with `key`.
fn record<'a>(status: &'a str, key: &str) -> Option<&'a str> {
    status.lines().find_map(|line| line.strip_prefix(key))
}

/// Extracts the effective capability set as 32-bit words, least
/// significant word first.
///
/// The kernel emits a single big-endian hex number, which is split into
/// words from the right. Several whitespace-separated tokens are taken as
/// consecutive words in the order given. A missing record, an empty value
/// or any malformed token result in an empty set.
#[must_use]
pub fn effective_caps(status: &str) -> Vec<u32> {
    let Some(value) = record(status, CAP_EFF_KEY) else {
        return Vec::new();
    };
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let words = match tokens.as_slice() {
        [] => None,
        [single] => split_words(single),
        many => many.iter().map(|token| parse_word(token)).collect(),
    };
    words.unwrap_or_else(|| {
        tracing::warn!(value, "malformed effective capabilities record");
        Vec::new()
    })
}

/// Parses a single token of at most eight hex digits.
fn parse_word(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > WORD_DIGITS || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(token, 16).ok()
}

/// Splits a big-endian hex number into words, least significant first.
fn split_words(token: &str) -> Option<Vec<u32>> {
    if !token.is_ascii() {
        return None;
    }
    let mut words = Vec::with_capacity(token.len().div_ceil(WORD_DIGITS));
    let mut end = token.len();
    while end > 0 {
        let start = end.saturating_sub(WORD_DIGITS);
        words.push(parse_word(&token[start..end])?);
        end = start;
    }
    Some(words)
}

/// Extracts the effective UID from the `Uid:` record.
#[must_use]
pub fn effective_uid(status: &str) -> Option<Uid> {
    record(status, UID_KEY)?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()
}
