//! Ordered rule table. Each rule either answers or passes; the first answer wins.

use super::knowledge::{
    CAPITALS, COMPARISONS, GREETING_EXPANDED, GREETING_SHORTS, HOW_TO, TOPICS,
};
use concise_core::conversation::{HistoryEntry, MessageRole};
use concise_core::response::AiResponse;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;

static ARITHMETIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*([+\-*/])\s*(\d+)").expect("Invalid regex"));
static GREETING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(hi|hello|hey|good morning|good afternoon|good evening)$").expect("Invalid regex")
});
static THANKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(thanks?|thank you)").expect("Invalid regex"));
static AFFIRMATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(yes|yeah|yep|sure|ok|okay)$").expect("Invalid regex"));
static NEGATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(no|nope|nah)$").expect("Invalid regex"));
static OK_FAMILY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(ok|okay|sure|alright|fine)$").expect("Invalid regex"));
static PRAISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(cool|awesome|nice|good|great)$").expect("Invalid regex"));

const SHORT_MESSAGE_CHARS: usize = 20;

/// The input as the rules see it.
pub(crate) struct Query<'a> {
    pub original: &'a str,
    /// Lowercased and trimmed
    pub lower: String,
    pub history: &'a [HistoryEntry],
}

impl<'a> Query<'a> {
    pub fn new(text: &'a str, history: &'a [HistoryEntry]) -> Self {
        Self {
            original: text,
            lower: text.trim().to_lowercase(),
            history,
        }
    }

    fn mentions_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.lower.contains(needle))
    }
}

pub(crate) type Rule = fn(&Query<'_>) -> Option<AiResponse>;

/// Rules in priority order, named for logging.
pub(crate) const RULES: &[(&str, Rule)] = &[
    ("context", context),
    ("arithmetic", arithmetic),
    ("topic", topic),
    ("capital", capital),
    ("how_to", how_to),
    ("comparison", comparison),
    ("greeting", greeting),
    ("courtesy", courtesy),
    ("question", question),
    ("short_message", short_message),
];

fn reply(short: impl Into<String>, expanded: impl Into<String>) -> Option<AiResponse> {
    Some(AiResponse::new(short, expanded))
}

fn context(query: &Query<'_>) -> Option<AiResponse> {
    if query.history.is_empty() {
        return None;
    }

    if query.mentions_any(&[
        "last question",
        "what was asked",
        "previous question",
        "what did i ask",
    ]) {
        if let Some(last) = query
            .history
            .iter()
            .rev()
            .find(|entry| entry.role == MessageRole::User)
        {
            return reply(
                format!("Your last question was: \"{}\"", last.content),
                format!(
                    "Based on our conversation history, your last question was: \"{}\". This was part of the discussion we had before branching into this new conversation thread.",
                    last.content
                ),
            );
        }
    }

    if query.mentions_any(&[
        "what were we talking about",
        "conversation context",
        "what was discussed",
        "previous discussion",
    ]) {
        return reply(
            "We were discussing topics from our previous conversation.",
            "Based on our conversation history, we were discussing various topics. The context includes our previous exchange, which helps me understand the background of our current discussion in this branch.",
        );
    }

    None
}

fn arithmetic(query: &Query<'_>) -> Option<AiResponse> {
    let captures = ARITHMETIC_RE.captures(&query.lower)?;
    let a: f64 = captures[1].parse().ok()?;
    let b: f64 = captures[3].parse().ok()?;

    let (operation, result) = match &captures[2] {
        "+" => ("plus", (a + b).to_string()),
        "-" => ("minus", (a - b).to_string()),
        "*" => ("times", (a * b).to_string()),
        "/" if b == 0.0 => ("divided by", "undefined (division by zero)".to_string()),
        "/" => ("divided by", (a / b).to_string()),
        _ => return None,
    };

    reply(
        format!("{a} {operation} {b} = {result}"),
        format!(
            "The calculation {a} {operation} {b} equals {result}. This is a basic arithmetic operation."
        ),
    )
}

fn topic(query: &Query<'_>) -> Option<AiResponse> {
    TOPICS
        .iter()
        .find(|topic| query.mentions_any(topic.keywords) && !query.mentions_any(topic.excluded))
        .and_then(|topic| reply(topic.short, topic.expanded))
}

fn capital(query: &Query<'_>) -> Option<AiResponse> {
    if !query.mentions_any(&["capital of", "what is the capital"]) {
        return None;
    }

    let (country, capital) = CAPITALS
        .iter()
        .find(|(country, _)| query.lower.contains(country))?;
    let country = capitalize_first(country);

    reply(
        format!("The capital of {country} is {capital}."),
        format!(
            "{capital} is the capital of {country}. It is a major hub for politics, culture, and history, and is home to many iconic landmarks and institutions."
        ),
    )
}

fn how_to(query: &Query<'_>) -> Option<AiResponse> {
    if !query.mentions_any(&["how to", "how do i"]) {
        return None;
    }

    HOW_TO
        .iter()
        .find(|(topic, _, _)| query.lower.contains(topic))
        .and_then(|(_, short, expanded)| reply(*short, *expanded))
}

fn comparison(query: &Query<'_>) -> Option<AiResponse> {
    if !query.mentions_any(&["vs", "versus", "difference between"]) {
        return None;
    }

    COMPARISONS
        .iter()
        .find(|(left, right, _, _)| query.lower.contains(left) && query.lower.contains(right))
        .and_then(|(_, _, short, expanded)| reply(*short, *expanded))
}

fn greeting(query: &Query<'_>) -> Option<AiResponse> {
    if !GREETING_RE.is_match(&query.lower) {
        return None;
    }

    let mut rng = rand::thread_rng();
    let short = GREETING_SHORTS.choose(&mut rng)?;
    let expanded = GREETING_EXPANDED.choose(&mut rng)?;
    reply(*short, *expanded)
}

fn courtesy(query: &Query<'_>) -> Option<AiResponse> {
    let lower = query.lower.as_str();

    if lower.contains("how are you") {
        return reply(
            "I'm doing great!",
            "Thanks for asking! As an AI, I don't have feelings, but I'm fully operational and ready to assist you with anything you need. Let me know how I can help!",
        );
    }
    if THANKS_RE.is_match(lower) {
        return reply(
            "You're welcome! 😊",
            "You're very welcome! I'm always here to help. If you have more questions or need assistance, don't hesitate to ask!",
        );
    }
    if AFFIRMATION_RE.is_match(lower) {
        return reply(
            "Got it! 👍",
            "Understood! If there's anything else you'd like to discuss or clarify, let me know. I'm here to help!",
        );
    }
    if NEGATION_RE.is_match(lower) {
        return reply(
            "Alright. 👌",
            "No problem! If you change your mind or have any questions later, feel free to ask. I'm here whenever you need me.",
        );
    }
    if lower.contains("who are you") {
        return reply(
            "I'm your AI assistant! 🤖",
            "I'm an AI assistant designed to help you with a variety of tasks. Whether you need answers, explanations, or creative ideas, I'm here to assist. Let me know how I can make your day easier!",
        );
    }

    None
}

fn question(query: &Query<'_>) -> Option<AiResponse> {
    if !query.lower.contains('?') || !query.mentions_any(&["what", "how", "why", "when", "where"])
    {
        return None;
    }

    reply(
        "I don't have specific information about that.",
        format!(
            "I understand you're asking about \"{}\", but I don't have specific information about that topic. I can help with technology, programming, general knowledge, math, and common questions. Could you try rephrasing or ask about something else?",
            query.original
        ),
    )
}

fn short_message(query: &Query<'_>) -> Option<AiResponse> {
    if query.lower.chars().count() >= SHORT_MESSAGE_CHARS {
        return None;
    }

    if OK_FAMILY_RE.is_match(&query.lower) {
        return reply(
            "Great! 👍",
            "Perfect! I'm ready to help you with whatever you need next.",
        );
    }
    if PRAISE_RE.is_match(&query.lower) {
        return reply(
            "Glad you think so! 😊",
            "I'm happy you find that helpful! Is there anything else you'd like to know or discuss?",
        );
    }

    reply(
        "I understand!",
        format!(
            "I understand you said: \"{}\". I'm here to help with any questions or tasks you might have.",
            query.original
        ),
    )
}

/// Answer used when no rule matched.
pub(crate) fn generic(query: &Query<'_>) -> AiResponse {
    AiResponse::new(
        "I understand what you're saying.",
        format!(
            "I understand you said: \"{}\". I'm here to help with any follow-up questions or tasks you might have. I can answer questions about technology, programming, general knowledge, math, and more.",
            query.original
        ),
    )
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
