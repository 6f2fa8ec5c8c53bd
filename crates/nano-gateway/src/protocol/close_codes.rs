//! WebSocket close codes
//!
//! Codes the platform gateway uses when it closes a bot connection.

/// Gateway close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    /// Invalid opcode sent
    InvalidOpcode,
    /// Invalid payload
    InvalidPayload,
    /// Session id is no longer valid
    InvalidSessionId,
    /// Sequence number rejected on resume
    SeqError,
    /// Sending payloads too fast
    RateLimited,
    /// Session timed out
    SessionTimeout,
    /// Invalid shard tuple
    InvalidShard,
    /// Bot joined too many guilds to run unsharded
    TooManyGuilds,
    /// Invalid gateway version
    InvalidVersion,
    /// Invalid intents bitmask
    InvalidIntent,
    /// Intents not granted to this bot
    IntentNoPermission,
    /// Platform-side error, one of 4900..=4913
    Internal(u16),
    /// Bot is offline or limited to the sandbox
    Offline,
    /// Bot is banned
    Banned,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4001 => Some(Self::InvalidOpcode),
            4002 => Some(Self::InvalidPayload),
            4006 => Some(Self::InvalidSessionId),
            4007 => Some(Self::SeqError),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::TooManyGuilds),
            4012 => Some(Self::InvalidVersion),
            4013 => Some(Self::InvalidIntent),
            4014 => Some(Self::IntentNoPermission),
            4900..=4913 => Some(Self::Internal(value)),
            4914 => Some(Self::Offline),
            4915 => Some(Self::Banned),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::InvalidOpcode => 4001,
            Self::InvalidPayload => 4002,
            Self::InvalidSessionId => 4006,
            Self::SeqError => 4007,
            Self::RateLimited => 4008,
            Self::SessionTimeout => 4009,
            Self::InvalidShard => 4010,
            Self::TooManyGuilds => 4011,
            Self::InvalidVersion => 4012,
            Self::InvalidIntent => 4013,
            Self::IntentNoPermission => 4014,
            Self::Internal(code) => code,
            Self::Offline => 4914,
            Self::Banned => 4915,
        }
    }

    /// Check if the session may be resumed after this close code
    ///
    /// When false the old session is gone and a fresh identify is required.
    #[must_use]
    pub const fn can_resume(self) -> bool {
        !matches!(
            self,
            Self::InvalidSessionId
                | Self::SeqError
                | Self::InvalidShard
                | Self::InvalidIntent
                | Self::IntentNoPermission
                | Self::Banned
        )
    }

    /// Resume decision for a raw close code; unknown codes resume
    #[must_use]
    pub fn resumable(code: u16) -> bool {
        Self::from_u16(code).map_or(true, Self::can_resume)
    }

    /// Get a human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidOpcode => "Invalid opcode",
            Self::InvalidPayload => "Invalid payload",
            Self::InvalidSessionId => "Session id is invalid",
            Self::SeqError => "Sequence number rejected",
            Self::RateLimited => "Rate limited",
            Self::SessionTimeout => "Session timed out",
            Self::InvalidShard => "Invalid shard",
            Self::TooManyGuilds => "Too many guilds, sharding required",
            Self::InvalidVersion => "Invalid gateway version",
            Self::InvalidIntent => "Invalid intents",
            Self::IntentNoPermission => "Intents not permitted",
            Self::Internal(_) => "Internal platform error",
            Self::Offline => "Bot is offline or sandbox only",
            Self::Banned => "Bot is banned",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}
