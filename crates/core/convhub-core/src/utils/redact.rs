//! Redaction of secrets before they reach the logs

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_LOGGED_CHARS: usize = 2000;

static PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"sk-[A-Za-z0-9_-]{16,}", "sk-REDACTED"),
        (r"(?i)bearer\s+[A-Za-z0-9._~+/=-]{8,}", "Bearer REDACTED"),
        (
            r"(?i)api[_-]?key\s*[:=]?\s*[A-Za-z0-9_-]{12,}",
            "api_key=REDACTED",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// Truncate and mask credentials in text destined for the logs
pub fn scrub_message(message: &str) -> String {
    let mut s: String = message.chars().take(MAX_LOGGED_CHARS).collect();
    for (re, rep) in PATTERNS.iter() {
        s = re.replace_all(&s, *rep).into_owned();
    }
    s
}
