//! Admin commands
//!
//! Registered on their own engine at priority 1 with `block`, outside every
//! service gate, so they keep working in silenced groups.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use nano_core::digest_id;

use super::Manager;
use crate::context::Ctx;
use crate::matcher::Engine;
use crate::rules::{self, LimiterManager};

pub const ADMIN_PRIORITY: i32 = 1;

/// `response` / `silence` calls allowed per group and day
const SWITCH_BURST: NonZeroU32 = NonZeroU32::MIN.saturating_add(3);
const SWITCH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

impl Manager {
    /// Register the admin commands into the manager's registry
    pub fn register_admin(self: &Arc<Self>) -> Arc<Engine> {
        let engine = Engine::new(Arc::clone(self.registry())).with_priority(ADMIN_PRIORITY);
        let switches = LimiterManager::<u64>::new(SWITCH_PERIOD, SWITCH_BURST);

        engine
            .on_message_command("response", [rules::user_or_group_admin(), switches.rule(Ctx::group_id)])
            .set_block(true)
            .handle_owned(with(self, response));
        engine
            .on_message_command("silence", [rules::user_or_group_admin(), switches.rule(Ctx::group_id)])
            .set_block(true)
            .handle_owned(with(self, silence));
        engine
            .on_message_command("enable", [rules::user_or_group_admin()])
            .set_block(true)
            .handle_owned(with(self, enable));
        engine
            .on_message_command("disable", [rules::user_or_group_admin()])
            .set_block(true)
            .handle_owned(with(self, disable));
        engine
            .on_message_command("allenable", [rules::super_user(), rules::only_to_me()])
            .set_block(true)
            .handle_owned(with(self, enable_everywhere));
        engine
            .on_message_command("alldisable", [rules::super_user(), rules::only_to_me()])
            .set_block(true)
            .handle_owned(with(self, disable_everywhere));
        engine
            .on_message_command("ban", [rules::admin()])
            .set_block(true)
            .handle_owned(with(self, ban));
        engine
            .on_message_command("permit", [rules::admin()])
            .set_block(true)
            .handle_owned(with(self, permit));
        engine
            .on_message_command("usage", [])
            .set_block(true)
            .handle_owned(with(self, usage));
        engine
            .on_message_command("service_list", [])
            .set_block(true)
            .handle_owned(with(self, service_list));

        tracing::debug!(matchers = engine.matchers().len(), "Admin commands registered");
        Arc::new(engine)
    }
}

fn with<F, Fut>(manager: &Arc<Manager>, f: F) -> impl Fn(Ctx) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<Manager>, Ctx) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let manager = Arc::clone(manager);
    move |ctx| f(Arc::clone(&manager), ctx)
}

async fn reply(ctx: &Ctx, text: impl Into<String>) {
    if let Err(e) = ctx.send_text(text).await {
        tracing::warn!(error = %e, "Failed to send admin reply");
    }
}

fn args(ctx: &Ctx) -> Vec<String> {
    ctx.state
        .get_str("args")
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// User id from a mention or a bare id; QQ open ids are digested
fn parse_user(arg: &str) -> Option<u64> {
    let id = arg
        .strip_prefix("<@!")
        .or_else(|| arg.strip_prefix("<@"))
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(arg);
    if id.is_empty() {
        return None;
    }
    Some(id.parse().unwrap_or_else(|_| digest_id(id)))
}

async fn response(manager: Arc<Manager>, ctx: Ctx) {
    let text = if manager.respond(ctx.group_id()) {
        "Responding in this chat again"
    } else {
        "Already responding in this chat"
    };
    reply(&ctx, text).await;
}

async fn silence(manager: Arc<Manager>, ctx: Ctx) {
    let text = if manager.silence(ctx.group_id()) {
        "Silenced in this chat"
    } else {
        "Already silent in this chat"
    };
    reply(&ctx, text).await;
}

async fn set_enabled(manager: &Manager, ctx: &Ctx, enabled: bool, everywhere: bool) {
    let Some(name) = args(ctx).into_iter().next() else {
        reply(ctx, "Usage: <service>").await;
        return;
    };
    let Some(control) = manager.lookup(&name) else {
        reply(ctx, format!("No such service: {name}")).await;
        return;
    };
    match (everywhere, enabled) {
        (true, _) => control.set_all(enabled),
        (false, true) => control.enable(ctx.group_id()),
        (false, false) => control.disable(ctx.group_id()),
    }
    tracing::info!(service = %name, enabled, everywhere, group = ctx.group_id(), "Service switched");

    let state = if enabled { "Enabled" } else { "Disabled" };
    let scope = if everywhere { "everywhere" } else { "here" };
    reply(ctx, format!("{state} {name} {scope}")).await;
}

async fn enable(manager: Arc<Manager>, ctx: Ctx) {
    set_enabled(&manager, &ctx, true, false).await;
}

async fn disable(manager: Arc<Manager>, ctx: Ctx) {
    set_enabled(&manager, &ctx, false, false).await;
}

async fn enable_everywhere(manager: Arc<Manager>, ctx: Ctx) {
    set_enabled(&manager, &ctx, true, true).await;
}

async fn disable_everywhere(manager: Arc<Manager>, ctx: Ctx) {
    set_enabled(&manager, &ctx, false, true).await;
}

async fn ban(manager: Arc<Manager>, ctx: Ctx) {
    let args = args(&ctx);
    let (Some(name), Some(user)) = (args.first(), args.get(1).and_then(|a| parse_user(a))) else {
        reply(&ctx, "Usage: ban <service> <user>").await;
        return;
    };
    let Some(control) = manager.lookup(name) else {
        reply(&ctx, format!("No such service: {name}")).await;
        return;
    };
    control.ban(user, ctx.group_id());
    reply(&ctx, format!("Banned {user} from {name} here")).await;
}

async fn permit(manager: Arc<Manager>, ctx: Ctx) {
    let args = args(&ctx);
    let (Some(name), Some(user)) = (args.first(), args.get(1).and_then(|a| parse_user(a))) else {
        reply(&ctx, "Usage: permit <service> <user>").await;
        return;
    };
    let Some(control) = manager.lookup(name) else {
        reply(&ctx, format!("No such service: {name}")).await;
        return;
    };
    let text = if control.permit(user, ctx.group_id()) {
        format!("Permitted {user} to use {name} here")
    } else {
        format!("{user} is not banned from {name} here")
    };
    reply(&ctx, text).await;
}

async fn usage(manager: Arc<Manager>, ctx: Ctx) {
    let Some(name) = args(&ctx).into_iter().next() else {
        reply(&ctx, "Usage: usage <service>").await;
        return;
    };
    let text = match manager.lookup(&name) {
        Some(control) if control.help().is_empty() => format!("{name} has no help text"),
        Some(control) => control.help().to_string(),
        None => format!("No such service: {name}"),
    };
    reply(&ctx, text).await;
}

async fn service_list(manager: Arc<Manager>, ctx: Ctx) {
    let group = ctx.group_id();
    let lines: Vec<String> = manager
        .services()
        .iter()
        .enumerate()
        .map(|(i, control)| {
            let state = if control.is_enabled_in(group) { "on" } else { "off" };
            format!("{}: [{state}] {}", i + 1, control.service())
        })
        .collect();
    let text = if lines.is_empty() {
        "No services registered".to_string()
    } else {
        lines.join("\n")
    };
    reply(&ctx, text).await;
}
