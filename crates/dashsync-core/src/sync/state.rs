use std::fmt::Display;

use serde::Serialize;

/// Message used when a failure renders as an empty string.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Observable result of a [`Fetcher`](super::Fetcher).
///
/// Loading does not clear data: a refresh keeps the previous `data` (and
/// `error`) visible until it settles, and a failed refresh keeps the last good
/// `data` next to the new `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    /// State before the first cycle settles.
    pub const fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    pub const fn is_settled(&self) -> bool {
        !self.loading
    }

    /// True once any cycle has produced either a value or an error.
    pub const fn has_outcome(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
    }

    pub(crate) fn settle_success(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.loading = false;
    }

    pub(crate) fn settle_failure(&mut self, message: String) {
        self.error = Some(message);
        self.loading = false;
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

/// Renders a failure reason, substituting [`GENERIC_ERROR_MESSAGE`] for blanks.
pub fn error_message(reason: &dyn Display) -> String {
    let message = reason.to_string();
    if message.trim().is_empty() {
        String::from(GENERIC_ERROR_MESSAGE)
    } else {
        message
    }
}
