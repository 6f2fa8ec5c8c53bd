//! Rules over the message text
//!
//! Patterns are escaped the same way outbound text is, so a rule written
//! with a literal `<` matches content the platform delivered as `&lt;`.

use nano_core::message_escape;
use regex::Regex;

use crate::context::Ctx;
use crate::matcher::Rule;

/// Non-empty content of a message event
fn content(ctx: &Ctx) -> Option<&str> {
    ctx.text_message()
        .map(|m| m.content.as_str())
        .filter(|c| !c.is_empty())
}

fn escaped(patterns: &[&str]) -> Vec<(String, String)> {
    patterns
        .iter()
        .map(|p| ((*p).to_string(), message_escape(p)))
        .collect()
}

/// Content starts with `prefix`; sets `prefix` and `args` (left-trimmed rest)
pub fn prefix(prefix: &str) -> Rule {
    prefix_group(&[prefix])
}

pub fn prefix_group(prefixes: &[&str]) -> Rule {
    let prefixes = escaped(prefixes);
    Rule::new(move |ctx| {
        let found = content(ctx).and_then(|content| {
            prefixes.iter().find_map(|(raw, escaped)| {
                let rest = content.strip_prefix(escaped.as_str())?;
                Some((raw.clone(), rest.trim_start_matches(' ').to_string()))
            })
        });
        let Some((prefix, args)) = found else {
            return false;
        };
        ctx.state.insert("prefix", prefix);
        ctx.state.insert("args", args);
        true
    })
}

/// Content ends with `suffix`; sets `suffix` and `args` (right-trimmed rest)
pub fn suffix(suffix: &str) -> Rule {
    suffix_group(&[suffix])
}

pub fn suffix_group(suffixes: &[&str]) -> Rule {
    let suffixes = escaped(suffixes);
    Rule::new(move |ctx| {
        let found = content(ctx).and_then(|content| {
            suffixes.iter().find_map(|(raw, escaped)| {
                let rest = content.strip_suffix(escaped.as_str())?;
                Some((raw.clone(), rest.trim_end_matches(' ').to_string()))
            })
        });
        let Some((suffix, args)) = found else {
            return false;
        };
        ctx.state.insert("suffix", suffix);
        ctx.state.insert("args", args);
        true
    })
}

/// Content contains `keyword`; sets `keyword`
pub fn keyword(keyword: &str) -> Rule {
    keyword_group(&[keyword])
}

pub fn keyword_group(keywords: &[&str]) -> Rule {
    let keywords = escaped(keywords);
    Rule::new(move |ctx| {
        let found = content(ctx).and_then(|content| {
            keywords
                .iter()
                .find(|(_, escaped)| content.contains(escaped.as_str()))
                .map(|(raw, _)| raw.clone())
        });
        let Some(keyword) = found else {
            return false;
        };
        ctx.state.insert("keyword", keyword);
        true
    })
}

/// Content equals `text`; sets `matched`
pub fn full_match(text: &str) -> Rule {
    full_match_group(&[text])
}

pub fn full_match_group(texts: &[&str]) -> Rule {
    let texts = escaped(texts);
    Rule::new(move |ctx| {
        let found = content(ctx).and_then(|content| {
            texts
                .iter()
                .find(|(_, escaped)| content == escaped)
                .map(|(raw, _)| raw.clone())
        });
        let Some(matched) = found else {
            return false;
        };
        ctx.state.insert("matched", matched);
        true
    })
}

/// Content matches `pattern`; sets `regex_matched` to the capture list
///
/// Index 0 is the whole match; groups that did not participate are empty.
///
/// # Errors
/// Returns an error when `pattern` does not compile.
pub fn regex(pattern: &str) -> Result<Rule, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Rule::new(move |ctx| {
        let captures = content(ctx).and_then(|content| {
            regex.captures(content).map(|caps| {
                caps.iter()
                    .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect::<Vec<_>>()
            })
        });
        let Some(captures) = captures else {
            return false;
        };
        ctx.state.insert("regex_matched", captures);
        true
    }))
}

/// Message quotes the message with id `message_id`
pub fn reply_to(message_id: &str) -> Rule {
    let message_id = message_id.to_string();
    Rule::new(move |ctx| {
        ctx.text_message()
            .and_then(|m| m.reply_target())
            .is_some_and(|target| target == message_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use crate::testing::message_ctx;

    async fn check(rule: &Rule, content: &str) -> Option<Ctx> {
        let mut ctx = message_ctx(EventType::AtMessageCreate, content);
        let matched = rule.check(&mut ctx).await;
        matched.then_some(ctx)
    }

    #[tokio::test]
    async fn test_prefix() {
        let rule = prefix("echo ");
        let ctx = check(&rule, "echo hello").await.unwrap();
        assert_eq!(ctx.state.get_str("prefix"), Some("echo "));
        assert_eq!(ctx.state.get_str("args"), Some("hello"));

        assert!(check(&rule, "echohello").await.is_none());
        assert!(check(&rule, "").await.is_none());
    }

    #[tokio::test]
    async fn test_prefix_trims_left_only() {
        let ctx = check(&prefix("say"), "say   hi there ").await.unwrap();
        assert_eq!(ctx.state.get_str("args"), Some("hi there "));
    }

    #[tokio::test]
    async fn test_prefix_compares_escaped() {
        let ctx = check(&prefix("<b>"), "&lt;b&gt; bold").await.unwrap();
        assert_eq!(ctx.state.get_str("prefix"), Some("<b>"));
        assert_eq!(ctx.state.get_str("args"), Some("bold"));
    }

    #[tokio::test]
    async fn test_prefix_group_first_wins() {
        let ctx = check(&prefix_group(&["he", "hello"]), "hello").await.unwrap();
        assert_eq!(ctx.state.get_str("prefix"), Some("he"));
        assert_eq!(ctx.state.get_str("args"), Some("llo"));
    }

    #[tokio::test]
    async fn test_suffix() {
        let ctx = check(&suffix("吗"), "好吗").await.unwrap();
        assert_eq!(ctx.state.get_str("suffix"), Some("吗"));
        assert_eq!(ctx.state.get_str("args"), Some("好"));

        let ctx = check(&suffix_group(&["?", "!"]), "really  !").await.unwrap();
        assert_eq!(ctx.state.get_str("args"), Some("really"));
        assert!(check(&suffix("?"), "no").await.is_none());
    }

    #[tokio::test]
    async fn test_keyword_and_full_match() {
        let ctx = check(&keyword_group(&["cat", "dog"]), "hot dog stand").await.unwrap();
        assert_eq!(ctx.state.get_str("keyword"), Some("dog"));

        let ctx = check(&full_match("ping"), "ping").await.unwrap();
        assert_eq!(ctx.state.get_str("matched"), Some("ping"));
        assert!(check(&full_match("ping"), "ping!").await.is_none());
        assert!(check(&full_match_group(&["a", "b"]), "c").await.is_none());
    }

    #[tokio::test]
    async fn test_regex_captures() {
        let rule = regex(r"^roll (\d+)d(\d+)( adv)?$").unwrap();
        let ctx = check(&rule, "roll 2d6").await.unwrap();
        let captures = ctx.state.get::<Vec<String>>("regex_matched").unwrap();
        assert_eq!(captures, &vec!["roll 2d6".to_string(), "2".into(), "6".into(), String::new()]);

        assert!(check(&rule, "roll two").await.is_none());
        assert!(regex("(").is_err());
    }

    #[tokio::test]
    async fn test_reply_to() {
        let rule = reply_to("m0");
        let mut ctx = message_ctx(EventType::AtMessageCreate, "re");
        assert!(!rule.check(&mut ctx).await);

        ctx.text_message_mut().unwrap().message_reference =
            Some(nano_core::MessageReference::new("m0"));
        assert!(rule.check(&mut ctx).await);
    }

    #[tokio::test]
    async fn test_text_rules_ignore_deletes() {
        let mut ctx = message_ctx(EventType::MessageDelete, "echo hi");
        assert!(!prefix("echo").check(&mut ctx).await);
    }
}
