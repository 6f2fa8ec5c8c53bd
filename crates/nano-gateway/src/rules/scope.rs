//! Where an event came from and who sent it

use crate::matcher::Rule;

/// Message addressed to the bot
pub fn only_to_me() -> Rule {
    Rule::new(|ctx| ctx.is_to_me)
}

pub fn only_direct() -> Rule {
    Rule::new(|ctx| ctx.only_direct())
}

pub fn only_public() -> Rule {
    Rule::new(|ctx| ctx.only_public())
}

pub fn only_private() -> Rule {
    Rule::new(|ctx| ctx.only_private())
}

pub fn only_qq() -> Rule {
    Rule::new(|ctx| ctx.only_qq())
}

pub fn only_qq_group() -> Rule {
    Rule::new(|ctx| ctx.only_qq_group())
}

pub fn only_qq_private() -> Rule {
    Rule::new(|ctx| ctx.only_qq_private())
}

pub fn only_guild() -> Rule {
    Rule::new(|ctx| ctx.only_guild())
}

pub fn only_channel() -> Rule {
    Rule::new(|ctx| ctx.only_channel())
}

fn owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| (*id).to_string()).collect()
}

/// Sender is one of `user_ids`
pub fn check_user(user_ids: &[&str]) -> Rule {
    let ids = owned(user_ids);
    Rule::new(move |ctx| ctx.message().is_some_and(|m| ids.iter().any(|id| id == m.author_id())))
}

/// Message was posted in one of `channel_ids`
pub fn check_channel(channel_ids: &[&str]) -> Rule {
    let ids = owned(channel_ids);
    Rule::new(move |ctx| ctx.message().is_some_and(|m| ids.contains(&m.channel_id)))
}

/// Message was posted in one of `guild_ids`
pub fn check_guild(guild_ids: &[&str]) -> Rule {
    let ids = owned(guild_ids);
    Rule::new(move |ctx| ctx.message().is_some_and(|m| ids.contains(&m.guild_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use crate::testing::message_ctx;

    #[tokio::test]
    async fn test_only_to_me() {
        let mut direct = message_ctx(EventType::DirectMessageCreate, "hi");
        assert!(only_to_me().check(&mut direct).await);

        let mut at = message_ctx(EventType::AtMessageCreate, "hi");
        assert!(!only_to_me().check(&mut at).await);
        at.is_to_me = true;
        assert!(only_to_me().check(&mut at).await);
    }

    #[tokio::test]
    async fn test_channel_shapes() {
        let mut group = message_ctx(EventType::GroupAtMessageCreate, "hi");
        assert!(only_qq().check(&mut group).await);
        assert!(only_qq_group().check(&mut group).await);
        assert!(!only_guild().check(&mut group).await);
        assert!(!only_qq_private().check(&mut group).await);

        let mut at = message_ctx(EventType::AtMessageCreate, "hi");
        assert!(only_public().check(&mut at).await);
        assert!(only_channel().check(&mut at).await);
        assert!(!only_private().check(&mut at).await);
        assert!(!only_direct().check(&mut at).await);
    }

    #[tokio::test]
    async fn test_id_checks() {
        let mut ctx = message_ctx(EventType::AtMessageCreate, "hi");
        assert!(check_user(&["3", "7"]).check(&mut ctx).await);
        assert!(!check_user(&["8"]).check(&mut ctx).await);
        assert!(check_channel(&["100"]).check(&mut ctx).await);
        assert!(!check_channel(&["101"]).check(&mut ctx).await);
        assert!(check_guild(&["200"]).check(&mut ctx).await);
        assert!(!check_guild(&[]).check(&mut ctx).await);
    }
}
