//! Plain-text excerpts of markdown bodies

use regex::Regex;
use std::sync::OnceLock;

/// Default excerpt length in characters
pub const DEFAULT_EXCERPT_LENGTH: usize = 200;

struct ExcerptPatterns {
    image: Regex,
    link: Regex,
    heading: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
    newlines: Regex,
    trailing_word: Regex,
}

fn patterns() -> &'static ExcerptPatterns {
    static PATTERNS: OnceLock<ExcerptPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ExcerptPatterns {
        image: Regex::new(r"!\[.*?\]\(.*?\)").expect("excerpt regex"),
        link: Regex::new(r"\[([^\]]+)\]\(.*?\)").expect("excerpt regex"),
        heading: Regex::new(r"#{1,6}\s+").expect("excerpt regex"),
        bold: Regex::new(r"\*\*([^*]+)\*\*").expect("excerpt regex"),
        italic: Regex::new(r"\*([^*]+)\*").expect("excerpt regex"),
        code: Regex::new(r"`([^`]+)`").expect("excerpt regex"),
        newlines: Regex::new(r"\n+").expect("excerpt regex"),
        trailing_word: Regex::new(r"\s+\S*$").expect("excerpt regex"),
    })
}

/// Strip markdown and cut to at most `max_chars`, ending on a word boundary
pub fn generate_excerpt(content: &str, max_chars: usize) -> String {
    let p = patterns();

    let plain = p.image.replace_all(content, "");
    let plain = p.link.replace_all(&plain, "$1");
    let plain = p.heading.replace_all(&plain, "");
    let plain = p.bold.replace_all(&plain, "$1");
    let plain = p.italic.replace_all(&plain, "$1");
    let plain = p.code.replace_all(&plain, "$1");
    let plain = p.newlines.replace_all(&plain, " ");
    let plain = plain.trim();

    if plain.chars().count() <= max_chars {
        return plain.to_string();
    }

    let cut: String = plain.chars().take(max_chars).collect();
    format!("{}...", p.trailing_word.replace(&cut, ""))
}
