//! End-of-Session Detection
//!
//! Decides whether a line of user input means "I'm finished". When it does,
//! the controller closes the session locally instead of forwarding the text
//! to the backend.
//!
//! The strategy sits behind [`TerminationClassifier`] so the controller does
//! not care whether it is substring matching, a regex set or a model call.

/// Classifies user input as a request to end the conversation
pub trait TerminationClassifier: Send + Sync {
    /// True when `text` asks to end the session
    fn is_termination_request(&self, text: &str) -> bool;
}

/// Keywords that end a session by default
pub const DEFAULT_TERMINATION_KEYWORDS: &[&str] = &[
    "all done",
    "done",
    "exit",
    "bye",
    "thank you",
    "thanks",
    "goodbye",
    "start over",
    "new chat",
    "clear chat",
];

/// Case-insensitive substring matcher over a fixed keyword list
///
/// There is no negation handling: "not done yet" contains "done" and is
/// treated as a termination request.
#[derive(Clone, Debug)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    /// Build a classifier from a keyword list; keywords are lower-cased and
    /// blank entries dropped
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// First keyword contained in `text`, if any
    #[must_use]
    pub fn matched_keyword(&self, text: &str) -> Option<&str> {
        let lowered = text.trim().to_lowercase();
        self.keywords
            .iter()
            .find(|k| lowered.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Configured keywords
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINATION_KEYWORDS)
    }
}

impl TerminationClassifier for KeywordClassifier {
    fn is_termination_request(&self, text: &str) -> bool {
        self.matched_keyword(text).is_some()
    }
}
