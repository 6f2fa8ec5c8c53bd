//! Sender permission checks
//!
//! Role checks need both the author and the guild member of the message.
//! Configured super users pass every check, with or without a member.

use nano_core::entities::roles;

use crate::context::Ctx;
use crate::matcher::Rule;

/// Sender is a configured super user
pub fn is_super_user(ctx: &Ctx) -> bool {
    ctx.message()
        .and_then(|m| m.author.as_ref())
        .is_some_and(|author| ctx.bot().config().is_super_user(&author.id))
}

fn has_role(ctx: &Ctx, role_ids: &[&str]) -> bool {
    if is_super_user(ctx) {
        return true;
    }
    let Some(message) = ctx.message() else {
        return false;
    };
    if message.author.is_none() {
        return false;
    }
    message
        .member
        .as_ref()
        .is_some_and(|member| member.has_any_role(role_ids))
}

/// Sender owns the guild
pub fn is_creator(ctx: &Ctx) -> bool {
    has_role(ctx, &[roles::CREATOR])
}

/// Sender administers the guild
pub fn is_admin(ctx: &Ctx) -> bool {
    has_role(ctx, &[roles::CREATOR, roles::ADMIN])
}

/// Sender administers the channel or the guild
pub fn is_channel_admin(ctx: &Ctx) -> bool {
    has_role(ctx, &[roles::CREATOR, roles::ADMIN, roles::CHANNEL_ADMIN])
}

pub fn super_user() -> Rule {
    Rule::new(|ctx| is_super_user(ctx))
}

pub fn creator() -> Rule {
    Rule::new(|ctx| is_creator(ctx))
}

pub fn admin() -> Rule {
    Rule::new(|ctx| is_admin(ctx))
}

pub fn channel_admin() -> Rule {
    Rule::new(|ctx| is_channel_admin(ctx))
}

/// Guild admins in public channels; anyone talking to the bot privately
pub fn user_or_group_admin() -> Rule {
    Rule::new(|ctx| {
        if ctx.only_public() {
            is_admin(ctx)
        } else {
            ctx.is_to_me
        }
    })
}

/// Channel admins in public channels; anyone talking to the bot privately
pub fn user_or_channel_admin() -> Rule {
    Rule::new(|ctx| {
        if ctx.only_public() {
            is_channel_admin(ctx)
        } else {
            ctx.is_to_me
        }
    })
}
