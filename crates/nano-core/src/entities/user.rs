//! User entity - a platform account as seen by the bot

use serde::{Deserialize, Serialize};

/// A user account
///
/// Guild events carry `id`; QQ group and c2c events identify users by the
/// open id fields instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub avatar: String,
    pub bot: bool,
    pub union_openid: String,
    pub union_user_account: String,
    pub user_openid: String,
    pub member_openid: String,
}

impl User {
    /// Create a user with only the id and name set
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    /// Render the mention token for this user: `<@!id>`
    pub fn at(&self) -> String {
        format!("<@!{}>", self.id)
    }

    /// Check if user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.bot
    }
}
