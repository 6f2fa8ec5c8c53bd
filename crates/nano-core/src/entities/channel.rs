//! Channel entity - a sub channel inside a guild

use serde::{Deserialize, Serialize};

/// Channel type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelType {
    #[default]
    Text,
    Voice,
    Category,
    Live,
    Application,
    Forum,
    Other(i32),
}

impl From<i32> for ChannelType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Text,
            2 => Self::Voice,
            4 => Self::Category,
            10005 => Self::Live,
            10006 => Self::Application,
            10007 => Self::Forum,
            other => Self::Other(other),
        }
    }
}

/// Channel payload of the channel create/update/delete dispatches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: String,
    pub guild_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: i32,
    pub sub_type: i32,
    pub position: i32,
    pub parent_id: String,
    pub owner_id: String,
    pub private_type: i32,
    pub speak_permission: i32,
    pub application_id: String,
    pub permissions: String,
    pub op_user_id: String,
}

impl Channel {
    /// Typed view of the raw `type` field
    pub fn channel_type(&self) -> ChannelType {
        ChannelType::from(self.kind)
    }
}
