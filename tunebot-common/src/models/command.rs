use serde::{Deserialize, Serialize};

/// Entry of the command menu a bot publishes to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: &str, description: &str) -> Self {
        Self {
            command: command.to_string(),
            description: description.to_string(),
        }
    }
}

/// A parsed `/name@bot arg1 arg2` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    /// `@botname` suffix, if the user addressed a specific bot.
    pub addressee: Option<String>,
    pub args: Vec<String>,
}

impl CommandInvocation {
    /// Parses a chat line. Returns `None` if it is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        if head.is_empty() {
            return None;
        }
        let (name, addressee) = match head.split_once('@') {
            Some((n, bot)) => (n, Some(bot.to_string())),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            addressee,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Whether this command is meant for the bot named `bot_username`.
    pub fn is_addressed_to(&self, bot_username: Option<&str>) -> bool {
        match (&self.addressee, bot_username) {
            (None, _) => true,
            (Some(a), Some(me)) => a.eq_ignore_ascii_case(me),
            // Username unknown: accept rather than drop the command.
            (Some(_), None) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_args() {
        let inv = CommandInvocation::parse("/song  Believer   Imagine Dragons").unwrap();
        assert_eq!(inv.name, "song");
        assert_eq!(inv.addressee, None);
        assert_eq!(inv.args, vec!["Believer", "Imagine", "Dragons"]);
    }

    #[test]
    fn parses_addressee() {
        let inv = CommandInvocation::parse("/play@Melody4StreamBot Believer").unwrap();
        assert_eq!(inv.name, "play");
        assert_eq!(inv.addressee.as_deref(), Some("Melody4StreamBot"));
        assert!(inv.is_addressed_to(Some("melody4streambot")));
        assert!(!inv.is_addressed_to(Some("Listen2PlayBot")));
    }

    #[test]
    fn rejects_non_commands() {
        assert!(CommandInvocation::parse("hello /song").is_none());
        assert!(CommandInvocation::parse("/").is_none());
        assert!(CommandInvocation::parse("/@bot").is_none());
        assert!(CommandInvocation::parse("   ").is_none());
    }
}
