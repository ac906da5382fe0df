//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per audio-depot endpoint.
//!
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Upload Endpoints
    // ========================================================================

    /// POST /post - raw body upload
    pub async fn post_raw(&self, data: Vec<u8>) -> Response {
        self.client
            .post(self.url("/post"))
            .body(data)
            .send()
            .await
            .expect("Raw upload request failed")
    }

    /// POST /post-file - one multipart file part per `(file_name, data)`
    pub async fn post_files(&self, files: Vec<(&str, Vec<u8>)>) -> Response {
        let mut form = Form::new();
        for (file_name, data) in files {
            form = form.part("file", Part::bytes(data).file_name(file_name.to_string()));
        }
        self.post_form(form).await
    }

    /// POST /post-file with a prebuilt form
    pub async fn post_form(&self, form: Form) -> Response {
        self.client
            .post(self.url("/post-file"))
            .multipart(form)
            .send()
            .await
            .expect("Multipart upload request failed")
    }

    // ========================================================================
    // Read Endpoints
    // ========================================================================

    /// GET /download?name=
    pub async fn download(&self, name: &str) -> Response {
        self.client
            .get(self.url("/download"))
            .query(&[("name", name)])
            .send()
            .await
            .expect("Download request failed")
    }

    /// GET /download?name= with a `Range` header
    pub async fn download_range(&self, name: &str, range: &str) -> Response {
        self.client
            .get(self.url("/download"))
            .query(&[("name", name)])
            .header(reqwest::header::RANGE, range)
            .send()
            .await
            .expect("Ranged download request failed")
    }

    /// GET /list with the given filters
    pub async fn list(&self, filters: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/list"))
            .query(filters)
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /info?name=
    pub async fn info(&self, name: &str) -> Response {
        self.client
            .get(self.url("/info"))
            .query(&[("name", name)])
            .send()
            .await
            .expect("Info request failed")
    }

    /// GET /info without a name
    pub async fn info_without_name(&self) -> Response {
        self.client
            .get(self.url("/info"))
            .send()
            .await
            .expect("Info request failed")
    }
}
