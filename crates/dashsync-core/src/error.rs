use thiserror::Error;

/// Validation errors for caller-supplied query input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("date range requires both a start and an end date")]
    IncompleteDateRange,

    #[error("base url must be an absolute http(s) url: '{value}'")]
    InvalidBaseUrl { value: String },
}

/// Failure of a single analytics API call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response arrived: the transport failed or the timeout elapsed.
    #[error("network error: {message}")]
    Network { message: String },

    /// The server answered with a non-2xx status.
    #[error("request failed with status code {status}")]
    Http { status: u16, body: String },

    /// The body was not valid JSON for the expected shape.
    #[error("failed to parse response body: {message}")]
    Parse { message: String },
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// HTTP status code, when the server responded at all.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network { .. } | Self::Parse { .. } => None,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Network { .. } => "api.network",
            Self::Http { .. } => "api.http",
            Self::Parse { .. } => "api.parse",
        }
    }
}
