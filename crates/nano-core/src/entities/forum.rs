//! Forum channel payloads
//!
//! Threads are the top level topics, posts comment on a thread and replies
//! answer a post.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thread {
    pub guild_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub thread_info: ThreadInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadInfo {
    pub thread_id: String,
    pub title: String,
    pub content: String,
    #[serde(with = "super::timestamp")]
    pub date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    pub guild_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub post_info: PostInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInfo {
    pub thread_id: String,
    pub post_id: String,
    pub content: String,
    #[serde(with = "super::timestamp")]
    pub date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reply {
    pub guild_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub reply_info: ReplyInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyInfo {
    pub thread_id: String,
    pub post_id: String,
    pub reply_id: String,
    pub content: String,
    #[serde(with = "super::timestamp")]
    pub date_time: Option<DateTime<FixedOffset>>,
}

/// Result of a forum publish audit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumAuditResult {
    pub guild_id: String,
    pub channel_id: String,
    pub author_id: String,
    pub thread_id: String,
    pub post_id: String,
    pub reply_id: String,
    #[serde(rename = "type")]
    pub kind: u32,
    pub result: u32,
    pub err_msg: String,
}

impl ForumAuditResult {
    /// `result == 0` means the item was published
    #[inline]
    pub fn passed(&self) -> bool {
        self.result == 0
    }
}
