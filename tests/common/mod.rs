//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{wav_file, TestClient, TestServer, BACH};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_upload() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.post_raw(wav_file(2, BACH)).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{wav_file, wav_with_tags, WavTags};
#[allow(unused_imports)]
pub use server::TestServer;
