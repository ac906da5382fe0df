//! Shared constants for end-to-end tests
//!
//! Tag values written into the fixture files and the timeouts the harness
//! uses.

#![allow(dead_code)]

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to answer on `/`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout for every request made by `TestClient`
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Fixture Tags
// ============================================================================

pub const BACH: &str = "Bach";

pub const HANDEL: &str = "Handel";

pub const GENRE_BAROQUE: &str = "Baroque";

pub const ALBUM_FUGUES: &str = "Fugues";

pub const ALBUM_SUITES: &str = "Suites";

pub const YEAR_1722: &str = "1722";

pub const YEAR_1717: &str = "1717";

// ============================================================================
// Fixture Audio Format
// ============================================================================

/// Fixture files are 8-bit mono PCM at this rate, so one second of audio is
/// this many bytes and long files stay small.
pub const FIXTURE_SAMPLE_RATE: u32 = 1000;
