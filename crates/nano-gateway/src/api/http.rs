//! `reqwest` implementation of [`OpenApi`]

use async_trait::async_trait;
use nano_common::BotConfig;
use nano_core::Member;
use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::models::GatewayUrl;
use super::{ApiError, ApiResult, MessagePost, OpenApi, ReplyTarget, SentMessage, ShardGateway};

/// Header carrying the app id on v2 calls
const UNION_APPID_HEADER: &str = "X-Union-Appid";

/// `{code, message}` prefix shared by every platform response body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CodeMessage {
    code: i64,
    message: String,
}

/// Platform REST client
#[derive(Debug, Clone)]
pub struct HttpOpenApi {
    client: reqwest::Client,
    base: String,
    authorization: String,
    app_id: String,
}

impl HttpOpenApi {
    /// Client for the REST base selected by the configuration
    pub fn new(config: &BotConfig) -> ApiResult<Self> {
        Self::with_base(config, config.api_base())
    }

    /// Client for an explicit REST base
    pub fn with_base(config: &BotConfig, base: impl Into<String>) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(config.api_timeout).build()?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            authorization: config.authorization(),
            app_id: config.app_id.clone(),
        })
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>, v2: bool) -> ApiResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base);
        debug!(%method, %url, "open api request");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::AUTHORIZATION, &self.authorization);
        if v2 {
            request = request.header(UNION_APPID_HEADER, &self.app_id);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        let base: CodeMessage = serde_json::from_slice(&bytes).unwrap_or_default();
        if status.is_client_error() || status.is_server_error() || base.code != 0 {
            warn!(status = status.as_u16(), code = base.code, message = %base.message, %url, "open api call failed");
            return Err(ApiError::status(status.as_u16(), base.code, &base.message));
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<(), T>(Method::GET, path, None, false)
            .await?
            .ok_or(ApiError::EmptyBody)
    }
}

#[async_trait]
impl OpenApi for HttpOpenApi {
    async fn fetch_gateway_url(&self) -> ApiResult<String> {
        Ok(self.get::<GatewayUrl>("/gateway").await?.url)
    }

    async fn fetch_shard_gateway(&self) -> ApiResult<ShardGateway> {
        self.get("/gateway/bot").await
    }

    async fn send_reply(&self, target: &ReplyTarget, post: &MessagePost) -> ApiResult<SentMessage> {
        let sent = self
            .request::<MessagePost, SentMessage>(Method::POST, &target.path(), Some(post), target.is_v2())
            .await?;
        Ok(sent.unwrap_or_default())
    }

    async fn fetch_member(&self, guild_id: &str, user_id: &str) -> ApiResult<Member> {
        self.get(&format!("/guilds/{guild_id}/members/{user_id}")).await
    }
}
