// crates/lectern-config/src/examples.rs
// ============================================================================
// Module: Lectern Config Examples
// Description: Deterministic generator for the canonical config example.
// Purpose: Keep documentation and defaults in one verifiable place.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Generates the canonical `lectern.toml` example. The example must always
//! parse and validate against the current model; a test pins that down.

// ============================================================================
// SECTION: Example Generation
// ============================================================================

/// Returns the canonical `lectern.toml` example.
#[must_use]
pub fn config_toml_example() -> String {
    let mut out = String::new();
    out.push_str("# Lectern configuration\n");
    out.push_str("# Contention retry policy around each enrollment attempt.\n");
    out.push_str("[retry]\n");
    out.push_str("max_attempts = 3\n");
    out.push_str("backoff_ms = 200\n");
    out.push('\n');
    out.push_str("# Enrollment store backend selection.\n");
    out.push_str("[store]\n");
    out.push_str("backend = \"sqlite\"\n");
    out.push('\n');
    out.push_str("[store.sqlite]\n");
    out.push_str("path = \"lectern.db\"\n");
    out.push_str("busy_timeout_ms = 5000\n");
    out.push_str("journal_mode = \"wal\"\n");
    out.push_str("sync_mode = \"full\"\n");
    out.push('\n');
    out.push_str("[store.memory]\n");
    out.push_str("lock_timeout_ms = 5000\n");
    out
}
