use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Preconditions attached to a request (`If-Match`, `If-None-Match`,
/// `If-Modified-Since`, `If-Unmodified-Since`).
///
/// Decorators pass conditions through untouched; only the backing store
/// evaluates them against the current state of the target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    pub if_match: Vec<String>,
    pub if_none_match: Vec<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
}

impl Conditions {
    /// Returns `true` if no precondition is set.
    pub fn is_empty(&self) -> bool {
        self.if_match.is_empty()
            && self.if_none_match.is_empty()
            && self.if_modified_since.is_none()
            && self.if_unmodified_since.is_none()
    }

    /// Evaluate against the target's current state.
    ///
    /// `etag` is `None` when the target does not exist.
    pub fn matches(&self, etag: Option<&str>, modified: Option<DateTime<Utc>>) -> bool {
        if !self.if_match.is_empty() {
            let Some(etag) = etag else {
                return false;
            };
            if !self.if_match.iter().any(|t| t == "*" || t == etag) {
                return false;
            }
        }

        if let Some(etag) = etag {
            if self.if_none_match.iter().any(|t| t == "*" || t == etag) {
                return false;
            }
        }

        if let (Some(_), Some(modified)) = (etag, modified) {
            if self.if_modified_since.is_some_and(|since| modified < since) {
                return false;
            }
            if self.if_unmodified_since.is_some_and(|since| modified > since) {
                return false;
            }
        }

        true
    }
}
