//! Derives the short synopsis shown in place of a full AI answer.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters kept from the raw text when it contains no sentence at all.
const RAW_PREVIEW_CHARS: usize = 100;
const MAX_SENTENCES: usize = 3;

static FENCED_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\s\S]*?```").expect("Invalid regex"));
static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#{1,6}\s+").expect("Invalid regex"));
static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid regex"));
static INLINE_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.*?)`").expect("Invalid regex"));
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("Invalid regex"));

/// Builds a synopsis of at most three sentences within `budget` characters.
///
/// Markdown is stripped first. When even the first sentence is over budget
/// the cleaned text is cut at a word boundary and ends with `...`.
pub fn summarize(full: &str, budget: usize) -> String {
    let cleaned = strip_markdown(full);

    let sentences: Vec<&str> = SENTENCE_END_RE
        .split(&cleaned)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect();

    if sentences.is_empty() {
        return preview(full, RAW_PREVIEW_CHARS);
    }

    let mut short = String::new();
    let mut total = 0;
    for sentence in sentences.iter().take(MAX_SENTENCES) {
        let length = sentence.chars().count() + 2;
        if total + length > budget {
            break;
        }
        if !short.is_empty() {
            short.push_str(". ");
        }
        short.push_str(sentence);
        total += length;
    }

    if short.is_empty() {
        return truncate_on_word(&cleaned, budget);
    }
    if !short.ends_with(['.', '!', '?']) {
        short.push('.');
    }
    short
}

fn strip_markdown(text: &str) -> String {
    let text = FENCED_CODE_RE.replace_all(text, "");
    let text = HEADER_RE.replace_all(&text, "");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = INLINE_CODE_RE.replace_all(&text, "$1");
    text.trim().to_string()
}

fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut head: String = text.chars().take(limit).collect();
    head.push_str("...");
    head
}

fn truncate_on_word(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let head: String = text.chars().take(budget).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(position) if position > 0 => &head[..position],
        _ => head.as_str(),
    };
    format!("{}...", cut.trim_end())
}
