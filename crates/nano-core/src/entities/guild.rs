//! Guild entity - a server the bot has joined

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Guild payload of the guild create/update/delete dispatches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub owner_id: String,
    pub owner: bool,
    #[serde(with = "super::timestamp")]
    pub joined_at: Option<DateTime<FixedOffset>>,
    pub member_count: u32,
    pub max_members: u32,
    pub description: String,
    /// Operator of the change, only on dispatches
    pub op_user_id: String,
}

impl Guild {
    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_guild_event() {
        let json = r#"{
            "id": "200",
            "name": "test guild",
            "owner_id": "7",
            "joined_at": "2021-11-23T15:16:48+08:00",
            "member_count": 12,
            "op_user_id": "7"
        }"#;
        let guild: Guild = serde_json::from_str(json).unwrap();
        assert!(guild.is_owner("7"));
        assert!(!guild.is_owner("8"));
        assert_eq!(guild.member_count, 12);
    }
}
