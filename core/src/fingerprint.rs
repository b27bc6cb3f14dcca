//! Winnowed document fingerprints built from character shingles.

use std::collections::HashSet;

use crate::ngram::{char_shingles, DEFAULT_SHINGLE_SIZE};

pub const DEFAULT_WINDOW_SIZE: usize = 4;

/// `hash * 31 + unit` over the UTF-16 code units of `s` with 32-bit signed
/// wrap-around, returned as an absolute value.
pub fn string_hash(s: &str) -> u32 {
    let hash = s.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    });
    hash.unsigned_abs()
}

/// Winnowed fingerprint using the default shingle length.
pub fn fingerprint(text: &str, window_size: usize) -> Vec<u32> {
    fingerprint_with(text, DEFAULT_SHINGLE_SIZE, window_size)
}

/// Hash every distinct shingle in first-occurrence order, keep the minimum
/// hash of each window of `window_size` consecutive hashes and drop repeats.
/// Fewer shingles than `window_size` yields an empty fingerprint.
pub fn fingerprint_with(text: &str, shingle_size: usize, window_size: usize) -> Vec<u32> {
    if window_size == 0 {
        return Vec::new();
    }
    let hashes: Vec<u32> = char_shingles(text, shingle_size)
        .iter()
        .map(|shingle| string_hash(shingle))
        .collect();

    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for window in hashes.windows(window_size) {
        if let Some(&min) = window.iter().min() {
            if seen.insert(min) {
                selected.push(min);
            }
        }
    }
    selected
}
