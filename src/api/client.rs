//! Major game HTTP client.
//!
//! Base URL: https://major.glados.app/api
//! Auth: `POST /auth/tg/` with Telegram init data, then
//! `Authorization: Bearer {access_token}` on every other call.
//!
//! Cooldowns and refusals come back as 4xx responses with a JSON body, so a
//! non-2xx status is not a transport failure as long as the body is JSON.
//! Only send errors and non-JSON error bodies are reported as `Err`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{decode, GameApi};
use crate::config::ApiConfig;
use crate::types::{ActionResult, Credential, MajorError, Session, Streak, Task, UserInfo, Visit};

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

const SERVICE_NAME: &str = "major";

const AUTH: &str = "/auth/tg/";
const USERS: &str = "/users/";
const STREAK: &str = "/user-visits/streak/";
const VISIT: &str = "/user-visits/visit/";
const ROULETTE: &str = "/roulette/";
const HOLD_COINS: &str = "/bonuses/coins/";
const TASKS: &str = "/tasks/";
const SWIPE_COIN: &str = "/swipe_coin/";

const ORIGIN: &str = "https://major.glados.app/reward";
const REFERER: &str = "https://major.glados.app/";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Major game API client.
pub struct MajorClient {
    http: Client,
    base_url: String,
}

impl MajorClient {
    /// Create a client with browser-like default headers.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(default_headers())
            .build()
            .context("Failed to build HTTP client for Major")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the JSON body regardless of status.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        session: Option<&Session>,
    ) -> Result<Value> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Major request");

        let mut req = self.http.request(method, &url);
        if let Some(session) = session {
            req = req.bearer_auth(session.access_token());
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.map_err(|e| MajorError::Transport {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| MajorError::Transport {
            endpoint: path.to_string(),
            message: format!("failed to read body ({status}): {e}"),
        })?;

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                if !status.is_success() {
                    debug!(status = %status, url = %url, body = %decode::summarize(&value), "Major error body");
                }
                Ok(value)
            }
            Err(_) if status.is_success() => Err(MajorError::Validation {
                endpoint: path.to_string(),
                message: format!("non-JSON body: {}", truncate(&text)),
            }
            .into()),
            Err(_) => Err(MajorError::Transport {
                endpoint: path.to_string(),
                message: format!("HTTP {status}: {}", truncate(&text)),
            }
            .into()),
        }
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.6"));
    headers.insert(header::ORIGIN, HeaderValue::from_static(ORIGIN));
    headers.insert(header::REFERER, HeaderValue::from_static(REFERER));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(r#""Not/A)Brand";v="99", "Google Chrome";v="115", "Chromium";v="115""#),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static(r#""Windows""#));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers
}

fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}

// ---------------------------------------------------------------------------
// GameApi trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl GameApi for MajorClient {
    async fn authenticate(&self, credential: &Credential) -> Result<Session> {
        let body = json!({ "init_data": credential.expose() });
        let value = self.call(Method::POST, AUTH, Some(body), None).await?;
        Ok(decode::session_from_auth(&value)?)
    }

    async fn user_info(&self, session: &Session) -> Result<UserInfo> {
        let path = format!("{USERS}{}/", session.user_id);
        let value = self.call(Method::GET, &path, None, Some(session)).await?;
        Ok(decode::user_info(&value)?)
    }

    async fn streak(&self, session: &Session) -> Result<Streak> {
        let value = self.call(Method::GET, STREAK, None, Some(session)).await?;
        Ok(decode::streak(&value)?)
    }

    async fn visit(&self, session: &Session) -> Result<ActionResult<Visit>> {
        let value = self.call(Method::POST, VISIT, Some(json!({})), Some(session)).await?;
        Ok(decode::visit(&value))
    }

    async fn spin_roulette(&self, session: &Session) -> Result<ActionResult<u64>> {
        let value = self.call(Method::POST, ROULETTE, Some(json!({})), Some(session)).await?;
        Ok(decode::roulette(&value))
    }

    async fn hold_coins(&self, session: &Session, coins: u32) -> Result<ActionResult<()>> {
        let body = json!({ "coins": coins });
        let value = self.call(Method::POST, HOLD_COINS, Some(body), Some(session)).await?;
        Ok(decode::success_flag(&value))
    }

    async fn swipe_coin_probe(&self, session: &Session) -> Result<bool> {
        let value = self.call(Method::GET, SWIPE_COIN, None, Some(session)).await?;
        Ok(decode::swipe_probe(&value))
    }

    async fn swipe_coin_submit(&self, session: &Session, coins: u32) -> Result<ActionResult<()>> {
        let body = json!({ "coins": coins });
        let value = self.call(Method::POST, SWIPE_COIN, Some(body), Some(session)).await?;
        Ok(decode::success_flag(&value))
    }

    async fn tasks(&self, session: &Session) -> Result<Vec<Task>> {
        let path = format!("{TASKS}?is_daily=false");
        let value = self.call(Method::GET, &path, None, Some(session)).await?;
        Ok(decode::tasks(&value)?)
    }

    async fn complete_task(&self, session: &Session, task: &Task) -> Result<ActionResult<()>> {
        let body = json!({ "task_id": task.id });
        let value = self.call(Method::POST, TASKS, Some(body), Some(session)).await?;
        Ok(decode::task_completion(&value))
    }

    fn name(&self) -> &str {
        SERVICE_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
