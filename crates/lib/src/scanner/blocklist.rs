//! Wallet blocklists: two independently fetched, independently cached JSON
//! lists (blocked fungible-asset types and blocked object types). Each is
//! fetched at most once per process lifetime; fetch failures degrade to an
//! empty set so a blocklist outage never blocks scanning.

use crate::{error::SkittyError, sanitize_error};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::OnceCell;

#[cfg(not(test))]
use crate::state::get_config;

#[cfg(test)]
use crate::tests::config_mock::mock_state::get_config;

static BLOCKLISTS: OnceCell<BlocklistSet> = OnceCell::const_new();

#[derive(Debug, Clone, Default)]
pub struct BlocklistSet {
    /// blocked coin type args (e.g. "0x..::module::TYPE")
    pub coin: HashSet<String>,
    /// blocked object types
    pub object: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct BlocklistResponse {
    #[serde(default)]
    blocklist: Vec<String>,
}

async fn fetch_blocklist(http: &reqwest::Client, url: &str) -> Result<HashSet<String>, SkittyError> {
    let response = http.get(url).send().await.map_err(|e| {
        SkittyError::RpcError(format!("Blocklist fetch failed: {}", sanitize_error!(e)))
    })?;
    if !response.status().is_success() {
        return Err(SkittyError::RpcError(format!(
            "Blocklist fetch returned HTTP {}",
            response.status()
        )));
    }
    let parsed: BlocklistResponse = response.json().await.map_err(|e| {
        SkittyError::RpcError(format!("Blocklist is not valid JSON: {}", sanitize_error!(e)))
    })?;
    Ok(parsed.blocklist.into_iter().collect())
}

async fn fetch_or_empty(http: &reqwest::Client, url: &str, which: &str) -> HashSet<String> {
    match fetch_blocklist(http, url).await {
        Ok(list) => {
            log::info!("Loaded {} {which} blocklist entries", list.len());
            list
        }
        Err(e) => {
            log::warn!("Could not load {which} blocklist, continuing without it: {e}");
            HashSet::new()
        }
    }
}

/// Fetch both blocklists once per process and cache them for the session
pub async fn get_blocklists() -> &'static BlocklistSet {
    BLOCKLISTS
        .get_or_init(|| async {
            let Ok(config) = get_config() else {
                return BlocklistSet::default();
            };
            let coin_url = config.blocklist.coin_url.clone();
            let object_url = config.blocklist.object_url.clone();
            let http = reqwest::Client::new();
            BlocklistSet {
                coin: fetch_or_empty(&http, &coin_url, "coin").await,
                object: fetch_or_empty(&http, &object_url, "object").await,
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_blocklist_parses_shape() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/coin-list.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"blocklist": ["0xbad::scam::SCAM", "0xbad::rug::RUG"]}"#)
            .create_async()
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/coin-list.json", server.url());
        let list = fetch_blocklist(&http, &url).await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("0xbad::scam::SCAM"));
    }

    #[tokio::test]
    async fn test_fetch_blocklist_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/coin-list.json")
            .with_status(500)
            .create_async()
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/coin-list.json", server.url());
        assert!(fetch_blocklist(&http, &url).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_or_empty_degrades() {
        let http = reqwest::Client::new();
        let list = fetch_or_empty(&http, "http://127.0.0.1:1/none.json", "coin").await;
        assert!(list.is_empty());
    }
}
