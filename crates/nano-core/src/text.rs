//! Message text helpers
//!
//! Outbound text is escaped before it is sent, and every text rule compares
//! against the escaped form of its pattern, so both directions agree on what
//! a literal `<`, `>` or `&` looks like on the wire.

/// Escape `&`, `<` and `>` the way the platform expects in message content
pub fn message_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Reverse [`message_escape`]
pub fn message_unescape(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Convert `ABC_DEF` (or `abc_def`) to `AbcDef`
pub fn underline_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for c in s.chars() {
        if c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Stable numeric digest of a string id
///
/// QQ group and c2c events identify chats and users by opaque open ids; the
/// service registry keys its state by `u64`, so those ids are folded into the
/// first eight bytes of their blake3 hash.
pub fn digest_id(id: &str) -> u64 {
    let hash = blake3::hash(id.as_bytes());
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(buf)
}

/// Render a mention of everyone
pub const AT_EVERYONE: &str = "@everyone";

/// Render a channel link: `<#id>`
pub fn at_channel(channel_id: &str) -> String {
    format!("<#{channel_id}>")
}

/// Render a platform emoji: `<emoji:id>`
pub fn emoji(id: u32) -> String {
    format!("<emoji:{id}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        let raw = "a<b>&c";
        let escaped = message_escape(raw);
        assert_eq!(escaped, "a&lt;b&gt;&amp;c");
        assert_eq!(message_unescape(&escaped), raw);
    }

    #[test]
    fn test_escape_ampersand_first() {
        // `<` must not become `&amp;lt;`
        assert_eq!(message_escape("<"), "&lt;");
    }

    #[test]
    fn test_underline_to_camel() {
        assert_eq!(underline_to_camel("AT_MESSAGE_CREATE"), "AtMessageCreate");
        assert_eq!(underline_to_camel("C2C_MESSAGE_CREATE"), "C2cMessageCreate");
        assert_eq!(underline_to_camel("READY"), "Ready");
        assert_eq!(underline_to_camel(""), "");
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(digest_id("E4F6A1B2"), digest_id("E4F6A1B2"));
        assert_ne!(digest_id("E4F6A1B2"), digest_id("E4F6A1B3"));
    }

    #[test]
    fn test_render_helpers() {
        assert_eq!(at_channel("100"), "<#100>");
        assert_eq!(emoji(4), "<emoji:4>");
    }
}
