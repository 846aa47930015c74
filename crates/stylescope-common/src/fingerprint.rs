//! Stable content fingerprints.
//!
//! Cache keys in the analyzer are built from fingerprints of the stylesheet
//! text and of the target identity. FxHasher is deterministic across runs
//! (no random seed), which keeps keys comparable between worker threads.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Hash any `Hash` value into a 64-bit fingerprint.
#[must_use]
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash a sequence of values in order, so `["a", "bc"]` and `["ab", "c"]`
/// produce different fingerprints.
#[must_use]
pub fn fingerprint_all<'a, I, T>(values: I) -> u64
where
    I: IntoIterator<Item = &'a T>,
    T: Hash + ?Sized + 'a,
{
    let mut hasher = FxHasher::default();
    let mut count = 0usize;
    for value in values {
        value.hash(&mut hasher);
        count += 1;
    }
    count.hash(&mut hasher);
    hasher.finish()
}
