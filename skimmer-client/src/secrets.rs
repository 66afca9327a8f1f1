//! Secret decryption endpoint
//!
//! Credential material may be configured as base64 ciphertext. It is sent to
//! the decryption service once at startup and the plaintext is kept in memory.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// HTTP client for the secret decryption service
#[derive(Debug, Clone)]
pub struct SecretClient {
    /// Decrypt endpoint URL
    url: String,
    /// HTTP client instance
    client: Client,
}

impl SecretClient {
    /// Create a new secret client for the decrypt endpoint at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    /// Create a new secret client with a custom HTTP client
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: crate::normalize_base_url(url),
            client,
        }
    }

    /// Decrypt a base64 ciphertext blob
    pub async fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if ciphertext.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "ciphertext cannot be empty".to_string(),
            ));
        }

        let response = self
            .client
            .post(&self.url)
            .json(&DecryptRequest { ciphertext })
            .send()
            .await?;

        let body: DecryptResponse = crate::handle_response(response).await?;
        Ok(body.plaintext)
    }
}

#[derive(Debug, Serialize)]
struct DecryptRequest<'a> {
    ciphertext: &'a str,
}

#[derive(Debug, Deserialize)]
struct DecryptResponse {
    plaintext: String,
}
