//! Pulling arguments out of free-form utterances.

use regex::Regex;
use std::sync::LazyLock;

/// Words that carry the command itself rather than its argument.
const COMMAND_WORDS: &[&str] = &[
    "matrix", "create", "make", "new", "delete", "remove", "search", "find", "folder", "file",
    "files", "for", "the", "a",
];

const CONFIRM_WORDS: &[&str] = &["yes", "confirm", "send", "ok", "okay", "sure"];

// The pattern is a literal, so compilation cannot fail.
#[allow(clippy::expect_used)]
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{6,15}$").expect("phone pattern is valid"));

/// Drop command words and keep the rest as a name.
///
/// `"create folder project notes"` becomes `"project notes"`.
pub fn extract_param(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !COMMAND_WORDS.contains(&word.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Words that link a command phrase to its query ("search youtube for lofi").
const CONNECTIVES: &[&str] = &["for", "about", "of"];

/// The query around the command phrase `pattern` in `text`.
///
/// The words after the phrase are the query, minus one leading connective;
/// when nothing follows, the words before it are used instead.
/// `"google search for rust"` with `"search for"` becomes `"rust"`, and
/// `"lofi beats youtube search"` with `"youtube search"` becomes
/// `"lofi beats"`. A pattern that does not occur leaves the text as is.
pub fn strip_command(text: &str, pattern: &str) -> String {
    let Some(at) = text.find(pattern) else {
        return collapse(text);
    };

    let after: Vec<&str> = text[at + pattern.len()..].split_whitespace().collect();
    let after = match after.split_first() {
        Some((first, rest)) if CONNECTIVES.contains(first) => rest,
        _ => after.as_slice(),
    };
    if !after.is_empty() {
        return after.join(" ");
    }
    collapse(&text[..at])
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `"OLD to NEW"` on a single standalone `to`.
pub fn parse_rename(text: &str) -> Option<(String, String)> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut separators = words
        .iter()
        .enumerate()
        .filter(|(_, word)| word.eq_ignore_ascii_case("to"))
        .map(|(i, _)| i);

    let at = separators.next()?;
    if separators.next().is_some() {
        return None;
    }

    let from = words[..at].join(" ");
    let to = words[at + 1..].join(" ");
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}

/// Normalize a spoken phone number: spaces and dashes removed, a leading
/// `+` and country code required.
pub fn clean_phone(text: &str) -> Option<String> {
    let phone: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    PHONE.is_match(&phone).then_some(phone)
}

/// Whether a reply means "yes, go ahead".
pub fn is_confirmation(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| CONFIRM_WORDS.contains(&word.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_param_drops_command_words() {
        assert_eq!(extract_param("create folder project notes"), "project notes");
        assert_eq!(extract_param("matrix delete the file report.txt"), "report.txt");
        assert_eq!(extract_param("find files invoice"), "invoice");
        assert_eq!(extract_param("create folder"), "");
    }

    #[test]
    fn test_extract_param_keeps_words_containing_command_words() {
        assert_eq!(extract_param("new folder newsletter"), "newsletter");
    }

    #[test]
    fn test_strip_command() {
        assert_eq!(strip_command("search for rust lifetimes", "search for"), "rust lifetimes");
        assert_eq!(strip_command("google   borrow checker", "google"), "borrow checker");
        assert_eq!(strip_command("search for", "search for"), "");
        assert_eq!(strip_command("weather today", "search"), "weather today");
    }

    #[test]
    fn test_strip_command_uses_the_matched_phrase() {
        assert_eq!(strip_command("google search for rust", "search for"), "rust");
        assert_eq!(strip_command("search youtube for lofi", "search youtube"), "lofi");
        assert_eq!(strip_command("lofi beats youtube search", "youtube search"), "lofi beats");
        assert_eq!(strip_command("open maps of paris", "open maps"), "paris");
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse_rename("draft.txt to final.txt"),
            Some((String::from("draft.txt"), String::from("final.txt")))
        );
        assert_eq!(
            parse_rename("my notes to old notes"),
            Some((String::from("my notes"), String::from("old notes")))
        );
        assert_eq!(parse_rename("tomato.txt to potato.txt").map(|p| p.1), Some(String::from("potato.txt")));
        assert_eq!(parse_rename("a to b to c"), None);
        assert_eq!(parse_rename("draft.txt"), None);
        assert_eq!(parse_rename("to final.txt"), None);
    }

    #[test]
    fn test_clean_phone() {
        assert_eq!(clean_phone("+91 98765-43210"), Some(String::from("+919876543210")));
        assert_eq!(clean_phone("9876543210"), None);
        assert_eq!(clean_phone("+12ab"), None);
    }

    #[test]
    fn test_is_confirmation() {
        assert!(is_confirmation("yes please"));
        assert!(is_confirmation("OK, send it"));
        assert!(!is_confirmation("no"));
        assert!(!is_confirmation("yesterday"));
    }
}
