//! Slash commands

use nano_core::message_escape;

use crate::context::Ctx;
use crate::matcher::Rule;

/// `/command args`; sets `command` and `args`
///
/// The content is trimmed in place, must start with `/`, is split at the
/// first space, and an `@bot` suffix on the command word is dropped. The
/// command word is compared by prefix against the escaped command.
pub fn command(command: &str) -> Rule {
    command_group(&[command])
}

pub fn command_group(commands: &[&str]) -> Rule {
    let commands: Vec<(String, String)> = commands
        .iter()
        .map(|c| ((*c).to_string(), message_escape(c)))
        .collect();
    Rule::new(move |ctx| {
        let Some((command, args)) = parse_command(ctx, &commands) else {
            return false;
        };
        ctx.state.insert("command", command);
        ctx.state.insert("args", args);
        true
    })
}

/// Command rule that also splits the arguments shell-style into `argv`
pub fn shell(command: &str) -> Rule {
    let command = command_group(&[command]);
    Rule::new_async(move |ctx| {
        let command = command.clone();
        Box::pin(async move {
            if !command.check(ctx).await {
                return false;
            }
            let argv = split_shell(ctx.state.get_str("args").unwrap_or_default());
            ctx.state.insert("argv", argv);
            true
        })
    })
}

/// State key of the arguments parsed by [`shell_with`]
pub const FLAG: &str = "flag";

/// Shell command whose arguments are parsed into `T`; sets `argv` and `flag`
///
/// Positional arguments are declared on `T` itself. Any parse error,
/// `--help` included, fails the rule.
pub fn shell_with<T>(command: &str) -> Rule
where
    T: clap::Parser + Send + Sync + 'static,
{
    let name = command.to_string();
    let shell = shell(command);
    Rule::new_async(move |ctx| {
        let shell = shell.clone();
        let name = name.clone();
        Box::pin(async move {
            if !shell.check(ctx).await {
                return false;
            }
            let argv = ctx.state.get::<Vec<String>>("argv").cloned().unwrap_or_default();
            let line = std::iter::once(name.as_str()).chain(argv.iter().map(String::as_str));
            match T::try_parse_from(line) {
                Ok(flag) => {
                    ctx.state.insert(FLAG, flag);
                    true
                }
                Err(e) => {
                    tracing::debug!(command = %name, kind = ?e.kind(), "Shell arguments rejected");
                    false
                }
            }
        })
    })
}

fn parse_command(ctx: &mut Ctx, commands: &[(String, String)]) -> Option<(String, String)> {
    let message = ctx.text_message_mut()?;
    let trimmed = message.content.trim().to_string();
    message.content = trimmed;

    let body = message.content.strip_prefix('/')?;
    let (word, args) = body.split_once(' ').unwrap_or((body, ""));
    let word = word.split_once('@').map_or(word, |(w, _)| w);

    commands
        .iter()
        .find(|(_, escaped)| word.starts_with(escaped.as_str()))
        .map(|(raw, _)| (raw.clone(), args.to_string()))
}

/// Split a command line into arguments
///
/// Whitespace separates arguments; single quotes keep their content
/// verbatim, double quotes allow backslash escapes, and a backslash outside
/// quotes escapes the next character.
pub fn split_shell(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut buf = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            buf.push(c);
            escaped = false;
            in_arg = true;
            continue;
        }
        match (quote, c) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('\''), _) => buf.push(c),
            (_, '\\') => escaped = true,
            (Some(_), _) => buf.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut buf));
                    in_arg = false;
                }
            }
            (None, _) => {
                buf.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(buf);
    }
    args
}
