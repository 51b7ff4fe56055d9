//! Incoming text → command
//!
//! All routing decisions happen here in one parse step; the handler only
//! matches on [`ChatCommand`].

use url::Url;

/// Everything the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// `/dl <url>` or a message that is exactly a URL
    Download(Url),
    /// Anything else, including `/dl` without a valid URL
    Unknown(String),
    /// A command addressed to another bot (`/start@other_bot`); never answered
    ForOtherBot(String),
}

impl ChatCommand {
    /// Parses a message text.
    ///
    /// Commands addressed to another bot (`/start@other_bot`) are `ForOtherBot`.
    /// With `bot_username` unknown, any `@suffix` is accepted.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Self {
        let trimmed = text.trim();

        let Some(command_line) = trimmed.strip_prefix('/') else {
            return match parse_download_url(trimmed) {
                Some(url) => ChatCommand::Download(url),
                None => ChatCommand::Unknown(trimmed.to_string()),
            };
        };

        let (head, args) = match command_line.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (command_line, ""),
        };
        let (name, target) = match head.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (head, None),
        };

        if let (Some(target), Some(username)) = (target, bot_username) {
            if !target.eq_ignore_ascii_case(username) {
                return ChatCommand::ForOtherBot(trimmed.to_string());
            }
        }

        match name.to_ascii_lowercase().as_str() {
            "start" => ChatCommand::Start,
            "help" => ChatCommand::Help,
            "dl" => {
                let first_arg = args.split_whitespace().next().unwrap_or_default();
                match parse_download_url(first_arg) {
                    Some(url) => ChatCommand::Download(url),
                    None => ChatCommand::Unknown(trimmed.to_string()),
                }
            }
            _ => ChatCommand::Unknown(trimmed.to_string()),
        }
    }
}

/// Whether the bot answers `command` at all.
///
/// Private chats get a reply to everything except commands for other bots.
/// Groups only get replies to recognized commands, bare URLs and `/dl`
/// attempts, so ordinary chatter and other bots' commands stay unanswered.
pub fn should_reply(is_private_chat: bool, command: &ChatCommand) -> bool {
    match command {
        ChatCommand::ForOtherBot(_) => false,
        ChatCommand::Start | ChatCommand::Help | ChatCommand::Download(_) => true,
        ChatCommand::Unknown(text) => is_private_chat || is_dl_attempt(text),
    }
}

/// `/dl` or `/dl@bot` with a missing or malformed argument
fn is_dl_attempt(text: &str) -> bool {
    let Some(command_line) = text.strip_prefix('/') else {
        return false;
    };
    let head = command_line.split_whitespace().next().unwrap_or_default();
    let name = head.split_once('@').map_or(head, |(name, _)| name);
    name.eq_ignore_ascii_case("dl")
}

/// Accepts a single token that is a syntactically valid http(s) URL with a host.
pub fn parse_download_url(candidate: &str) -> Option<Url> {
    if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(candidate).ok()?;
    let is_web = matches!(url.scheme(), "http" | "https");
    (is_web && url.host_str().is_some_and(|h| !h.is_empty())).then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_start_and_help() {
        assert_eq!(ChatCommand::parse("/start", None), ChatCommand::Start);
        assert_eq!(ChatCommand::parse("  /start  ", None), ChatCommand::Start);
        assert_eq!(ChatCommand::parse("/START", None), ChatCommand::Start);
        assert_eq!(ChatCommand::parse("/help", None), ChatCommand::Help);
    }

    #[test]
    fn test_dl_with_url() {
        assert_eq!(
            ChatCommand::parse("/dl https://youtu.be/dQw4w9WgXcQ", None),
            ChatCommand::Download(url("https://youtu.be/dQw4w9WgXcQ"))
        );
        // Extra arguments after the URL are ignored
        assert_eq!(
            ChatCommand::parse("/dl   https://youtu.be/abc please", None),
            ChatCommand::Download(url("https://youtu.be/abc"))
        );
    }

    #[test]
    fn test_dl_with_malformed_argument() {
        assert!(matches!(ChatCommand::parse("/dl", None), ChatCommand::Unknown(_)));
        assert!(matches!(ChatCommand::parse("/dl not-a-url", None), ChatCommand::Unknown(_)));
        assert!(matches!(ChatCommand::parse("/dl ftp://host/file", None), ChatCommand::Unknown(_)));
        assert!(matches!(ChatCommand::parse("/dl https://", None), ChatCommand::Unknown(_)));
    }

    #[test]
    fn test_bare_url() {
        assert_eq!(
            ChatCommand::parse("https://www.youtube.com/watch?v=abc\n", None),
            ChatCommand::Download(url("https://www.youtube.com/watch?v=abc"))
        );
        // URL embedded in a sentence is not a bare URL
        assert_eq!(
            ChatCommand::parse("look https://youtu.be/abc", None),
            ChatCommand::Unknown("look https://youtu.be/abc".to_string())
        );
    }

    #[test]
    fn test_bot_mention() {
        assert_eq!(ChatCommand::parse("/start@TubeDropBot", Some("tubedropbot")), ChatCommand::Start);
        assert_eq!(
            ChatCommand::parse("/dl@TubeDropBot https://youtu.be/abc", Some("TubeDropBot")),
            ChatCommand::Download(url("https://youtu.be/abc"))
        );
        assert_eq!(
            ChatCommand::parse("/start@OtherBot", Some("TubeDropBot")),
            ChatCommand::ForOtherBot("/start@OtherBot".to_string())
        );
        assert!(matches!(
            ChatCommand::parse("/dl@OtherBot https://youtu.be/abc", Some("TubeDropBot")),
            ChatCommand::ForOtherBot(_)
        ));
        assert_eq!(ChatCommand::parse("/start@AnyBot", None), ChatCommand::Start);
    }

    #[test]
    fn test_other_text() {
        assert_eq!(ChatCommand::parse("hello", None), ChatCommand::Unknown("hello".to_string()));
        assert!(matches!(ChatCommand::parse("/settings", None), ChatCommand::Unknown(_)));
    }

    fn reply_in(is_private_chat: bool, text: &str) -> bool {
        should_reply(is_private_chat, &ChatCommand::parse(text, Some("TubeDropBot")))
    }

    #[test]
    fn test_group_chat_replies() {
        assert!(!reply_in(false, "/start@OtherBot"));
        assert!(!reply_in(false, "/settings@OtherBot"));
        assert!(!reply_in(false, "hello"));
        assert!(!reply_in(false, "/settings"));
        assert!(reply_in(false, "https://youtu.be/abc"));
        assert!(reply_in(false, "/start@TubeDropBot"));
        assert!(reply_in(false, "/dl"));
        assert!(reply_in(false, "/dl@TubeDropBot not-a-url"));
    }

    #[test]
    fn test_private_chat_replies() {
        assert!(reply_in(true, "hello"));
        assert!(reply_in(true, "/settings"));
        assert!(reply_in(true, "/start"));
        assert!(!reply_in(true, "/start@OtherBot"));
    }
}
