//! Agent Text Sanitizer
//!
//! The backend's agents leave routing annotations such as
//! `(System: Transferring to Verification Agent)` in their replies. These are
//! meant for the pipeline, not the user, and are stripped before display.

use std::sync::LazyLock;

use regex::Regex;

/// `(System: ...)` up to the first closing parenthesis, with any newlines
/// in front of it. `.` does not cross lines.
static SYSTEM_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\n*\(System:.*?\)").expect("annotation pattern is valid")
});

/// Strips internal control annotations from agent text
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentSanitizer;

impl ContentSanitizer {
    /// Create a sanitizer
    pub fn new() -> Self {
        Self
    }

    /// Remove every `(System: ...)` annotation and trim the result.
    ///
    /// Removal repeats until nothing matches, so an annotation uncovered by
    /// removing another one is stripped too and `clean` is idempotent.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        let mut current = text.to_string();
        while SYSTEM_ANNOTATION.is_match(&current) {
            current = SYSTEM_ANNOTATION.replace_all(&current, "").into_owned();
        }
        current.trim().to_string()
    }
}
