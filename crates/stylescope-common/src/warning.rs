//! Analyzer warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the scanner, resolver and matcher to report inputs that were
//! handled but look suspicious (excessive nesting fan-out, unterminated
//! blocks, identities that could not be compiled).

use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<FxHashSet<String>>> = Mutex::new(None);

/// Warn about a suspicious input (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("Selector", "nesting fan-out produced 32 variants for '&--x'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if record(format!("[{component}] {message}")) {
        eprintln!("{}", format!("[stylescope {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call once before loading a new set of
/// stylesheets)
///
/// The dedup set is process-wide: clearing it while another analysis runs
/// lets that analysis repeat warnings it already printed. Cached per-file
/// results print nothing, since no resolution runs for them.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Insert `key` into the dedup set, returning `true` the first time it is seen.
///
/// A poisoned lock still holds a usable set; warnings are advisory, so the
/// poison is ignored rather than propagated.
fn record(key: String) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(FxHashSet::default)
        .insert(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deduplicates() {
        let key = "[Test] dedup-check-unique-key".to_string();
        assert!(record(key.clone()));
        assert!(!record(key));
    }

    #[test]
    fn test_warn_once_does_not_panic_on_repeat() {
        warn_once("Test", "repeated warning");
        warn_once("Test", "repeated warning");
    }
}
