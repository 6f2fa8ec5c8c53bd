//! The bot runtime
//!
//! A [`Bot`] owns everything its sessions share: configuration, the
//! outbound API, the matcher registry, the optional callback table, the
//! reply-chain cache and the registry of connected sessions. It lives for
//! the whole process.

use std::sync::Arc;

use nano_cache::ReplyChainCache;
use nano_common::{BotConfig, GatewayConfig};
use parking_lot::RwLock;

use crate::api::{ApiResult, HttpOpenApi, OpenApi};
use crate::connection::{Session, SessionManager};
use crate::dispatch::CallbackTable;
use crate::matcher::MatcherRegistry;

/// Shared state of one bot account
pub struct Bot {
    config: BotConfig,
    gateway: GatewayConfig,
    api: Arc<dyn OpenApi>,
    matchers: Arc<MatcherRegistry>,
    callbacks: Option<Arc<CallbackTable>>,
    replies: Arc<ReplyChainCache>,
    sessions: SessionManager,
    gateway_url: RwLock<Option<String>>,
}

impl Bot {
    pub fn builder(config: BotConfig) -> BotBuilder {
        BotBuilder::new(config)
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn gateway_config(&self) -> &GatewayConfig {
        &self.gateway
    }

    pub fn api(&self) -> &Arc<dyn OpenApi> {
        &self.api
    }

    pub fn matchers(&self) -> &Arc<MatcherRegistry> {
        &self.matchers
    }

    /// Static callback table; when present it replaces the matcher engine
    pub fn callbacks(&self) -> Option<&Arc<CallbackTable>> {
        self.callbacks.as_ref()
    }

    pub fn replies(&self) -> &Arc<ReplyChainCache> {
        &self.replies
    }

    /// Sessions currently connected
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Gateway url, fetched once and then cached
    pub async fn gateway_url(&self) -> ApiResult<String> {
        if let Some(url) = self.gateway_url.read().clone() {
            return Ok(url);
        }
        let url = self.api.fetch_gateway_url().await?;
        tracing::debug!(url = %url, "Gateway url fetched");
        *self.gateway_url.write() = Some(url.clone());
        Ok(url)
    }

    /// Spawn one session per shard
    ///
    /// A configured shard count of zero asks the server for the recommended
    /// count and runs every shard; otherwise only the configured shard runs.
    pub async fn start(self: &Arc<Self>) -> ApiResult<Vec<Arc<Session>>> {
        let shards: Vec<[u32; 2]> = if self.config.shard_count == 0 {
            let gateway = self.api.fetch_shard_gateway().await?;
            let count = gateway.shards.max(1);
            tracing::info!(
                shards = count,
                remaining = gateway.session_start_limit.remaining,
                "Shard gateway fetched"
            );
            if !gateway.url.is_empty() {
                *self.gateway_url.write() = Some(gateway.url);
            }
            (0..count).map(|index| [index, count]).collect()
        } else {
            vec![[self.config.shard_index, self.config.shard_count]]
        };

        Ok(shards
            .into_iter()
            .map(|shard| {
                tracing::info!(shard = ?shard, "Starting session");
                Session::spawn(Arc::clone(self), shard)
            })
            .collect())
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("app_id", &self.config.app_id)
            .field("matchers", &self.matchers.total())
            .field("callbacks", &self.callbacks)
            .field("sessions", &self.sessions)
            .finish()
    }
}

/// Builder for [`Bot`]
pub struct BotBuilder {
    config: BotConfig,
    gateway: GatewayConfig,
    api: Option<Arc<dyn OpenApi>>,
    matchers: Option<Arc<MatcherRegistry>>,
    callbacks: Option<CallbackTable>,
    replies: Option<Arc<ReplyChainCache>>,
    gateway_url: Option<String>,
}

impl BotBuilder {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            gateway: GatewayConfig::default(),
            api: None,
            matchers: None,
            callbacks: None,
            replies: None,
            gateway_url: None,
        }
    }

    pub fn gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }

    /// Outbound API; defaults to [`HttpOpenApi`] over the configured base
    pub fn api(mut self, api: Arc<dyn OpenApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Registry the bot dispatches into; defaults to a fresh one
    pub fn matchers(mut self, matchers: Arc<MatcherRegistry>) -> Self {
        self.matchers = Some(matchers);
        self
    }

    pub fn callbacks(mut self, callbacks: CallbackTable) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn replies(mut self, replies: Arc<ReplyChainCache>) -> Self {
        self.replies = Some(replies);
        self
    }

    /// Skip the gateway url lookup and dial `url` directly
    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = Some(url.into());
        self
    }

    pub fn build(self) -> ApiResult<Arc<Bot>> {
        let api: Arc<dyn OpenApi> = match self.api {
            Some(api) => api,
            None => Arc::new(HttpOpenApi::new(&self.config)?),
        };
        Ok(Arc::new(Bot {
            config: self.config,
            gateway: self.gateway,
            api,
            matchers: self.matchers.unwrap_or_else(MatcherRegistry::new_shared),
            callbacks: self.callbacks.map(Arc::new),
            replies: self.replies.unwrap_or_else(|| Arc::new(ReplyChainCache::new())),
            sessions: SessionManager::new(),
            gateway_url: RwLock::new(self.gateway_url),
        }))
    }
}
