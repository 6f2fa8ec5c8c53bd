//! Gateway intents bitflags
//!
//! Declared in the identify payload to select which dispatch categories the
//! gateway pushes to this session.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Event categories a session subscribes to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u32 {
        /// Guild create/update/delete, channel create/update/delete
        const GUILDS                       = 1 << 0;
        /// Member add/update/remove
        const GUILD_MEMBERS                = 1 << 1;
        /// Every message in a guild (private bots only)
        const GUILD_MESSAGES               = 1 << 9;
        /// Reaction add/remove
        const GUILD_MESSAGE_REACTIONS      = 1 << 10;
        /// Direct message create/delete
        const DIRECT_MESSAGE               = 1 << 12;
        /// Open forum thread/post/reply events
        const OPEN_FORUMS_EVENT            = 1 << 18;
        /// Audio or live channel member enter/exit
        const AUDIO_OR_LIVE_CHANNEL_MEMBER = 1 << 19;
        /// QQ group @ messages and c2c messages
        const GROUP_AND_C2C_EVENT          = 1 << 25;
        /// Interaction create
        const INTERACTION                  = 1 << 26;
        /// Message audit pass/reject
        const MESSAGE_AUDIT                = 1 << 27;
        /// Forum events (private bots only)
        const FORUMS_EVENT                 = 1 << 28;
        /// Audio start/finish/on-mic/off-mic
        const AUDIO_ACTION                 = 1 << 29;
        /// @ messages and public message delete
        const PUBLIC_GUILD_MESSAGES        = 1 << 30;

        /// Every guild-side category
        const ALL = Self::GUILDS.bits()
            | Self::GUILD_MEMBERS.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::GUILD_MESSAGE_REACTIONS.bits()
            | Self::DIRECT_MESSAGE.bits()
            | Self::OPEN_FORUMS_EVENT.bits()
            | Self::AUDIO_OR_LIVE_CHANNEL_MEMBER.bits()
            | Self::INTERACTION.bits()
            | Self::MESSAGE_AUDIT.bits()
            | Self::FORUMS_EVENT.bits()
            | Self::AUDIO_ACTION.bits()
            | Self::PUBLIC_GUILD_MESSAGES.bits();

        /// Categories available to public-domain bots
        const PUBLIC = Self::ALL.bits()
            & !Self::GUILD_MESSAGES.bits()
            & !Self::FORUMS_EVENT.bits();

        /// Categories available to private-domain bots
        const PRIVATE = Self::ALL.bits()
            & !Self::OPEN_FORUMS_EVENT.bits()
            & !Self::PUBLIC_GUILD_MESSAGES.bits();
    }
}

/// Error returned when an intents string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid intents: {0}")]
pub struct IntentsParseError(pub String);

impl Intents {
    /// Check whether every category in `required` is subscribed
    #[inline]
    pub fn covers(&self, required: Intents) -> bool {
        self.contains(required)
    }
}

impl Default for Intents {
    fn default() -> Self {
        Intents::PUBLIC
    }
}

impl FromStr for Intents {
    type Err = IntentsParseError;

    /// Accepts a preset name (`all`, `public`, `private`), a `|` separated
    /// list of flag names, or a decimal mask.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "all" => return Ok(Intents::ALL),
            "public" => return Ok(Intents::PUBLIC),
            "private" => return Ok(Intents::PRIVATE),
            _ => {}
        }
        if let Ok(bits) = trimmed.parse::<u32>() {
            return Ok(Intents::from_bits_truncate(bits));
        }
        bitflags::parser::from_str::<Intents>(&trimmed.to_ascii_uppercase())
            .map_err(|_| IntentsParseError(s.to_string()))
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u32::deserialize(deserializer).map(Intents::from_bits_truncate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_preset() {
        let public = Intents::PUBLIC;
        assert!(public.contains(Intents::PUBLIC_GUILD_MESSAGES));
        assert!(public.contains(Intents::DIRECT_MESSAGE));
        assert!(!public.contains(Intents::GUILD_MESSAGES));
        assert!(!public.contains(Intents::FORUMS_EVENT));
    }

    #[test]
    fn test_private_preset() {
        let private = Intents::PRIVATE;
        assert!(private.contains(Intents::GUILD_MESSAGES));
        assert!(private.contains(Intents::FORUMS_EVENT));
        assert!(!private.contains(Intents::OPEN_FORUMS_EVENT));
        assert!(!private.contains(Intents::PUBLIC_GUILD_MESSAGES));
    }

    #[test]
    fn test_group_events_are_opt_in() {
        assert!(!Intents::ALL.contains(Intents::GROUP_AND_C2C_EVENT));
    }

    #[test]
    fn test_parse_presets_and_masks() {
        assert_eq!("public".parse::<Intents>().unwrap(), Intents::PUBLIC);
        assert_eq!(" ALL ".parse::<Intents>().unwrap(), Intents::ALL);
        assert_eq!("513".parse::<Intents>().unwrap(), Intents::GUILDS | Intents::GUILD_MESSAGES);
    }

    #[test]
    fn test_parse_flag_names() {
        let parsed: Intents = "guilds | direct_message".parse().unwrap();
        assert_eq!(parsed, Intents::GUILDS | Intents::DIRECT_MESSAGE);
        assert!("not_a_flag".parse::<Intents>().is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&Intents::GUILDS).unwrap();
        assert_eq!(json, "1");
        let back: Intents = serde_json::from_str("1025").unwrap();
        assert_eq!(back, Intents::GUILDS | Intents::GUILD_MESSAGE_REACTIONS);
    }
}
