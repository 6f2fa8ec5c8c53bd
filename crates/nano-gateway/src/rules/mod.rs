//! Built-in rules
//!
//! Constructors for the common [`Rule`](crate::matcher::Rule)s: text
//! patterns, commands, channel shape, sender permissions, attachments and
//! rate limits. Rules that extract something store it in the context state
//! under the key named in their docs.

mod attachment;
mod command;
mod limit;
mod permission;
mod scope;
mod text;

pub use attachment::{has_attachments, must_provide_attachment, ATTACHMENTS, ATTACHMENT_TIMEOUT};
pub use command::{command, command_group, shell, shell_with, split_shell, FLAG};
pub use limit::LimiterManager;
pub use permission::{
    admin, channel_admin, creator, is_admin, is_channel_admin, is_creator, is_super_user, super_user,
    user_or_channel_admin, user_or_group_admin,
};
pub use scope::{
    check_channel, check_guild, check_user, only_channel, only_direct, only_guild, only_private,
    only_public, only_qq, only_qq_group, only_qq_private, only_to_me,
};
pub use text::{
    full_match, full_match_group, keyword, keyword_group, prefix, prefix_group, regex, reply_to, suffix,
    suffix_group,
};
