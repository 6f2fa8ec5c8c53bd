//! Member entity - a user's membership in a guild

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::User;

/// Well-known system role ids
pub mod roles {
    pub const ALL_MEMBERS: &str = "1";
    pub const ADMIN: &str = "2";
    pub const CREATOR: &str = "4";
    pub const CHANNEL_ADMIN: &str = "5";
}

/// Guild member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    /// Only present on member events and delete-operator lookups
    pub guild_id: String,
    pub user: Option<User>,
    pub nick: String,
    pub roles: Vec<String>,
    #[serde(with = "super::timestamp")]
    pub joined_at: Option<DateTime<FixedOffset>>,
    pub deaf: bool,
    pub mute: bool,
    pub pending: bool,
}

impl Member {
    /// Get display name (nickname if set, otherwise the user's name)
    pub fn display_name(&self) -> &str {
        if !self.nick.is_empty() {
            return &self.nick;
        }
        self.user.as_ref().map_or("", |u| u.username.as_str())
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|r| r == role_id)
    }

    /// Check if member holds any of the given roles
    pub fn has_any_role(&self, role_ids: &[&str]) -> bool {
        role_ids.iter().any(|id| self.has_role(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let mut member = Member {
            user: Some(User::new("2", "TestUser")),
            ..Member::default()
        };
        assert_eq!(member.display_name(), "TestUser");

        member.nick = "Nickname".to_string();
        assert_eq!(member.display_name(), "Nickname");
    }

    #[test]
    fn test_role_checks() {
        let member = Member {
            roles: vec![roles::ALL_MEMBERS.to_string(), roles::CHANNEL_ADMIN.to_string()],
            ..Member::default()
        };
        assert!(member.has_role(roles::CHANNEL_ADMIN));
        assert!(!member.has_role(roles::ADMIN));
        assert!(member.has_any_role(&[roles::ADMIN, roles::CHANNEL_ADMIN]));
        assert!(!member.has_any_role(&[roles::CREATOR]));
    }

    #[test]
    fn test_decode_member() {
        let json = r#"{
            "user": {"id": "7", "username": "bob"},
            "nick": "",
            "roles": ["4"],
            "joined_at": "2021-11-23T15:16:48+08:00"
        }"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert!(member.has_role(roles::CREATOR));
        assert!(member.joined_at.is_some());
        assert_eq!(member.display_name(), "bob");
    }
}
