//! Anonymous provider session: warm-up state and the anti-bot crumb.
//!
//! Cookies live in the transport's jar; this type only tracks whether the
//! warm-up ran and which crumb it produced. A `Session` belongs to one
//! [`crate::DataClient`], so separate clients never share tokens.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Placeholder substituted with the crumb in request URLs.
pub const CRUMB_PLACEHOLDER: &str = "{crumb}";

const MAX_CRUMB_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Uninitialized,
    /// Warm-up ran; some or all of its steps may have failed.
    Warm { has_crumb: bool },
}

#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
    crumb: Mutex<Option<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_warm(&self) -> bool {
        matches!(self.state(), SessionState::Warm { .. })
    }

    pub fn crumb(&self) -> Option<String> {
        self.crumb
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record the end of a warm-up and the crumb it produced, if any.
    pub fn mark_warm(&self, crumb: Option<String>) -> SessionState {
        let state = SessionState::Warm {
            has_crumb: crumb.is_some(),
        };
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = crumb;
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        state
    }

    /// Forget the crumb and warm-up so the next fetch warms up again.
    pub fn reset(&self) {
        *self.crumb.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = SessionState::Uninitialized;
    }

    /// Replace the crumb placeholder with the URL-encoded crumb, or nothing.
    pub fn substitute_crumb(&self, url: &str) -> String {
        if !url.contains(CRUMB_PLACEHOLDER) {
            return url.to_owned();
        }
        let crumb = self.crumb().unwrap_or_default();
        url.replace(CRUMB_PLACEHOLDER, &urlencoding::encode(&crumb))
    }
}

/// Validate a getcrumb response body.
///
/// A crumb is a short single token; HTML error pages and rate-limit notices
/// are rejected.
pub fn accept_crumb(body: &str) -> Option<String> {
    let candidate = body.trim();
    let lowered = candidate.to_ascii_lowercase();
    let plausible = !candidate.is_empty()
        && candidate.len() < MAX_CRUMB_LEN
        && !candidate.contains(char::is_whitespace)
        && !lowered.contains("<html")
        && !lowered.contains("too many requests");
    plausible.then(|| candidate.to_owned())
}
