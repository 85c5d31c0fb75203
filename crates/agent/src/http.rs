//! reqwest-backed [`GameApi`] implementation.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use gamebot_core::wire::{AccountSnapshot, ActionResponse, TaskSnapshot, UserEnvelope};
use gamebot_core::BotError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::client::GameApi;
use crate::credentials::InitData;
use crate::user_agent;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

/// Authenticated session against the game API.
pub struct HttpGameClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGameClient {
    /// Open a session: fetch the session cookies, then trade the init data
    /// for a bearer token.
    pub async fn connect(
        base_url: &str,
        init_data: &InitData,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("build http client")?;
        let mut client = Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        };

        client.bootstrap_session().await?;
        client.authenticate(init_data).await?;
        tracing::info!(base_url = %client.base_url, "session established");
        Ok(client)
    }

    async fn bootstrap_session(&self) -> anyhow::Result<()> {
        let resp = self
            .http
            .get(format!("{}/telegram", self.base_url))
            .headers(self.headers())
            .send()
            .await
            .context("session bootstrap request")?;
        if resp.status() != reqwest::StatusCode::OK {
            bail!("session bootstrap returned {}", resp.status());
        }
        Ok(())
    }

    async fn authenticate(&mut self, init_data: &InitData) -> anyhow::Result<()> {
        let auth: AuthResponse = self
            .request("authenticate", Method::POST, "/api/auth/telegram", Some(init_data.pairs()))
            .await
            .context("authenticate")?;
        self.token = Some(auth.token);
        Ok(())
    }

    fn headers(&self) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        h.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        h.insert(
            "sec-ch-ua",
            HeaderValue::from_static(
                "\"Android WebView\";v=\"131\", \"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"",
            ),
        );
        h.insert("sec-ch-ua-mobile", HeaderValue::from_static("?1"));
        h.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Android\""));
        h.insert("x-requested-with", HeaderValue::from_static("org.telegram.messenger"));
        h.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        h.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        h.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
        h.insert(
            "accept-language",
            HeaderValue::from_static("en,en-US;q=0.9,ru-RU;q=0.8,ru;q=0.7"),
        );
        if let Ok(ua) = HeaderValue::from_str(&user_agent::random_android_chrome()) {
            h.insert(USER_AGENT, ua);
        }
        if let Some(token) = &self.token {
            if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {token}")) {
                h.insert(AUTHORIZATION, bearer);
            }
        }
        h
    }

    async fn request<T, F>(
        &self,
        operation: &'static str,
        method: Method,
        endpoint: &str,
        form: Option<&[F]>,
    ) -> Result<T, BotError>
    where
        T: DeserializeOwned,
        F: serde::Serialize,
    {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .headers(self.headers());
        if let Some(form) = form {
            req = req.form(form);
        }

        let result = async {
            let resp = req
                .send()
                .await
                .map_err(|e| BotError::remote(operation, e))?
                .error_for_status()
                .map_err(|e| BotError::remote(operation, e))?;
            let body = resp.bytes().await.map_err(|e| BotError::remote(operation, e))?;
            tracing::debug!(
                target: "gamebot::api",
                endpoint,
                body = %String::from_utf8_lossy(&body),
                "api response"
            );
            let value: Value = serde_json::from_slice(&body)
                .map_err(|e| BotError::remote(operation, format!("decode body: {e}")))?;
            // JSON of the wrong shape is a malformed snapshot.
            serde_json::from_value::<T>(value)
                .map_err(|e| BotError::malformed(format!("{operation}: {e}")))
        }
        .await;

        if let Err(e) = &result {
            tracing::warn!(target: "gamebot::api", endpoint, error = %e, "api request failed");
        }
        result
    }

    async fn action(
        &self,
        operation: &'static str,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<ActionResponse, BotError> {
        let form = (!form.is_empty()).then_some(form);
        let body: Value = self.request(operation, Method::POST, endpoint, form).await?;
        let account = match body.get("user") {
            None | Some(Value::Null) => None,
            Some(user) => match AccountSnapshot::deserialize(user) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!(target: "gamebot::api", endpoint, error = %e, "unreadable user in action response");
                    None
                }
            },
        };
        Ok(ActionResponse { account })
    }
}

#[async_trait]
impl GameApi for HttpGameClient {
    async fn fetch_account(&self) -> Result<AccountSnapshot, BotError> {
        let env: UserEnvelope = self
            .request::<_, (&str, &str)>("fetch_account", Method::GET, "/api/user/get", None)
            .await?;
        env.into_account()
    }

    async fn fetch_tasks(&self) -> Result<TaskSnapshot, BotError> {
        self.request(
            "fetch_tasks",
            Method::POST,
            "/api/tasks/get",
            Some(&[("category", "sponsors")][..]),
        )
        .await
    }

    async fn claim_reward(&self) -> Result<ActionResponse, BotError> {
        self.action("claim_reward", "/api/game/claim", &[]).await
    }

    async fn claim_daily(&self) -> Result<ActionResponse, BotError> {
        self.action("claim_daily", "/api/user/daily_claim", &[("method", "ordinary")])
            .await
    }

    async fn buy_fuel(&self) -> Result<ActionResponse, BotError> {
        self.action("buy_fuel", "/api/boost/buy", &[("id", "1"), ("method", "coin")])
            .await
    }

    async fn buy_shield(&self) -> Result<ActionResponse, BotError> {
        self.action("buy_shield", "/api/boost/buy", &[("id", "2"), ("method", "coin")])
            .await
    }

    async fn buy_shield_immunity(&self) -> Result<ActionResponse, BotError> {
        self.action(
            "buy_shield_immunity",
            "/api/boost/buy",
            &[("id", "3"), ("method", "coin")],
        )
        .await
    }

    async fn complete_click_task(&self) -> Result<ActionResponse, BotError> {
        self.action("complete_click_task", "/api/tasks/onclick", &[]).await
    }

    async fn spin_roulette(&self) -> Result<ActionResponse, BotError> {
        self.action("spin_roulette", "/api/roulette/buy", &[("method", "free")])
            .await
    }
}
