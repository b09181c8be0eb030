//! Shared helpers for integration tests
//!
//! [`FakeAuthorizer`] stands in for the external authorization library. Tests
//! queue the answers it gives with [`FakeAuthorizerHandle::respond`] and read
//! the requests it received from `handle.requests_rx`.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use authorization_method::authorizer::{Authorizer, OAuth1TokenRequest, OAuth2AuthorizeRequest};
use authorization_method::settings::{OAuth1Token, TokenInfo};
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex};

/// An answer queued on the fake authorizer.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    /// A token echoing the request `state`
    Token(String),
    /// A token carrying a different `state`
    TokenWithState(String, String),
    /// A token echoing the request `state` with the given `expires_in`
    TokenExpiringIn(String, u64),
    /// An OAuth 1 token pair
    TokenPair(String, String),
    /// A failure with the given message
    Fail(String),
}

pub struct FakeAuthorizer {
    requests_tx: mpsc::UnboundedSender<OAuth2AuthorizeRequest>,
    responses_rx: Mutex<mpsc::UnboundedReceiver<FakeResponse>>,
}

pub struct FakeAuthorizerHandle {
    pub requests_rx: mpsc::UnboundedReceiver<OAuth2AuthorizeRequest>,
    responses_tx: mpsc::UnboundedSender<FakeResponse>,
}

impl FakeAuthorizer {
    pub fn new() -> (Self, FakeAuthorizerHandle) {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        (
            Self {
                requests_tx,
                responses_rx: Mutex::new(responses_rx),
            },
            FakeAuthorizerHandle {
                requests_rx,
                responses_tx,
            },
        )
    }

    async fn next_response(&self) -> FakeResponse {
        self.responses_rx
            .lock()
            .await
            .recv()
            .await
            .expect("no response queued on fake authorizer")
    }
}

impl FakeAuthorizerHandle {
    pub fn respond(&self, response: FakeResponse) {
        self.responses_tx
            .send(response)
            .expect("fake authorizer dropped");
    }
}

#[async_trait::async_trait]
impl Authorizer for FakeAuthorizer {
    async fn request_oauth2_token(
        &self,
        request: OAuth2AuthorizeRequest,
    ) -> anyhow::Result<TokenInfo> {
        let state = request.state.clone();
        let _ = self.requests_tx.send(request);
        match self.next_response().await {
            FakeResponse::Token(access_token) => Ok(TokenInfo {
                access_token,
                state: Some(state),
                expires_in: Some(3600),
                ..Default::default()
            }),
            FakeResponse::TokenWithState(access_token, state) => Ok(TokenInfo {
                access_token,
                state: Some(state),
                ..Default::default()
            }),
            FakeResponse::TokenExpiringIn(access_token, expires_in) => Ok(TokenInfo {
                access_token,
                state: Some(state),
                expires_in: Some(expires_in),
                ..Default::default()
            }),
            FakeResponse::Fail(message) => Err(anyhow::anyhow!(message)),
            FakeResponse::TokenPair(..) => Err(anyhow::anyhow!("unexpected OAuth 1 response")),
        }
    }

    async fn request_oauth1_token(&self, _request: OAuth1TokenRequest) -> anyhow::Result<OAuth1Token> {
        match self.next_response().await {
            FakeResponse::TokenPair(token, token_secret) => Ok(OAuth1Token {
                token,
                token_secret,
            }),
            FakeResponse::Fail(message) => Err(anyhow::anyhow!(message)),
            other => Err(anyhow::anyhow!("unexpected response: {:?}", other)),
        }
    }
}

pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

pub fn temp_settings_file(dir: &TempDir, contents: &str) -> PathBuf {
    let settings_path = dir.path().join("settings.json");
    fs::write(&settings_path, contents).expect("failed to write settings file");
    settings_path
}
