//! Off-topic keyword filtering for the assistant.
//!
//! Plain substring matching against lowercased text, applied both to incoming
//! questions and to extracted model replies. Coarse by intent: "market crash"
//! is denylisted while legitimate market questions pass.

/// Canned reply for off-topic questions and off-topic model output.
pub const OFF_TOPIC_REPLY: &str = "I can only answer real estate related questions.";

const DENYLIST: &[&str] = &[
    // politics / government
    "politic",
    "politics",
    "election",
    "president",
    "senate",
    "congress",
    "government",
    "party",
    "campaign",
    // weather / climate
    "weather",
    "forecast",
    "rain",
    "temperature",
    "storm",
    "climate",
    "heatwave",
    "hurricane",
    // other common off-topic categories
    "sports",
    "score",
    "movie",
    "film",
    "music",
    "song",
    "celebrity",
    "stock",
    "market crash",
    "crypto",
    "health",
    "doctor",
    "symptom",
    "covid",
    "vaccine",
];

/// True when the text contains any denylisted keyword (case-insensitive).
pub fn is_off_topic(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    DENYLIST.iter().any(|kw| lower.contains(kw))
}
