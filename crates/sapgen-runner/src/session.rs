//! Session identifier extraction from generator output.

use sapgen_core::SessionId;
use std::fmt::Debug;

/// Pulls the session identifier out of the generator's standard output.
///
/// The generator gives no structural guarantee about its output, so
/// implementations return `None` whenever they cannot find an identifier.
pub trait SessionExtractor: Send + Sync + Debug {
    /// Returns the session identifier printed by the generator, if any.
    fn extract(&self, stdout: &str) -> Option<SessionId>;
}

/// Finds the first line containing a marker and takes the text after it.
///
/// If the marker occurs several times on that line, the text after the last
/// occurrence is used. An empty remainder counts as no identifier.
///
/// # Examples
///
/// ```
/// use sapgen_runner::{MarkerExtractor, SessionExtractor};
///
/// let extractor = MarkerExtractor::new("Session ID:");
/// let stdout = "Analyzing config...\n✓ Session ID: abc123\nDone\n";
///
/// assert_eq!(extractor.extract(stdout).unwrap().as_str(), "abc123");
/// assert!(extractor.extract("no marker here").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    marker: String,
}

impl MarkerExtractor {
    /// Creates an extractor for the given marker.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl SessionExtractor for MarkerExtractor {
    fn extract(&self, stdout: &str) -> Option<SessionId> {
        let line = stdout.lines().find(|line| line.contains(&self.marker))?;
        let (_, rest) = line.rsplit_once(&self.marker)?;
        let token = rest.trim();
        (!token.is_empty()).then(|| SessionId::new(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(stdout: &str) -> Option<String> {
        MarkerExtractor::new("Session ID:")
            .extract(stdout)
            .map(|id| id.as_str().to_string())
    }

    #[test]
    fn test_plain_marker() {
        assert_eq!(extract("Session ID: abc123"), Some("abc123".to_string()));
    }

    #[test]
    fn test_marker_mid_line_and_whitespace() {
        assert_eq!(
            extract("[info] Session ID:   sess_01HX  \r\n"),
            Some("sess_01HX".to_string())
        );
    }

    #[test]
    fn test_first_matching_line_wins() {
        let stdout = "Session ID: first\nSession ID: second\n";
        assert_eq!(extract(stdout), Some("first".to_string()));
    }

    #[test]
    fn test_last_occurrence_on_line() {
        assert_eq!(
            extract("Session ID: old Session ID: new"),
            Some("new".to_string())
        );
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("Generated 4 files\n"), None);
        assert_eq!(extract("Session ID:   \n"), None);
    }

    #[test]
    fn test_custom_marker() {
        let extractor = MarkerExtractor::new("SESSION=");
        assert_eq!(extractor.extract("SESSION=xyz").unwrap().as_str(), "xyz");
    }
}
