//! Classification axes carried by every structured failure.
//!
//! A failure is tagged along three small, copyable axes:
//!
//! - [`FailureCategory`]: the nature of the failure (system, business, validation)
//! - [`ErrorOrigin`]: the subsystem whose namespace the code lives under
//! - [`TransportStatus`]: an optional hint for the transport layer
//!
//! None of these carry owned data, so they are `Copy` and compared by value.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Failure Category
// ============================================================================

/// Closed set of failure natures.
///
/// Renders in upper case (`SYSTEM`, `BUSINESS`, `VALIDATION`) because that is
/// the form that appears in rendered messages and fault payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCategory {
    /// Technical failure inside the platform (network, I/O, parsing, bugs).
    System,
    /// A business rule rejected the operation.
    Business,
    /// Input did not pass validation.
    Validation,
}

impl FailureCategory {
    /// Upper-case label used in rendered messages.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::Business => "BUSINESS",
            Self::Validation => "VALIDATION",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Error Origin
// ============================================================================

/// Subsystem tag used to namespace failure codes.
///
/// Each origin converts to a string prefix that already ends in `.`, so the
/// builder can concatenate it directly with a template code:
///
/// ```rust
/// use faultline::ErrorOrigin;
///
/// assert_eq!(ErrorOrigin::Client.prefix(), "Client.");
/// assert_eq!(ErrorOrigin::ServerProxy.prefix(), "Server.ServerProxy.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorOrigin {
    /// The failure was caused by the calling client.
    Client,
    /// The failure happened on the server side, subsystem unspecified.
    Server,
    /// The client-facing proxy of a security server.
    ClientProxy,
    /// The service-facing proxy of a security server.
    ServerProxy,
    /// The signing service.
    Signer,
    /// The central configuration services.
    GlobalConf,
}

impl ErrorOrigin {
    /// Every origin, in declaration order.
    pub const ALL: [ErrorOrigin; 6] = [
        Self::Client,
        Self::Server,
        Self::ClientProxy,
        Self::ServerProxy,
        Self::Signer,
        Self::GlobalConf,
    ];

    /// Namespace prefix, including the trailing separator.
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Client => "Client.",
            Self::Server => "Server.",
            Self::ClientProxy => "Server.ClientProxy.",
            Self::ServerProxy => "Server.ServerProxy.",
            Self::Signer => "Signer.",
            Self::GlobalConf => "GlobalConf.",
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().trim_end_matches('.'))
    }
}

// ============================================================================
// Transport Status
// ============================================================================

/// Transport status hint (HTTP class) attached to a failure.
///
/// This is only a hint for outward-facing adapters; the mapping from codes to
/// statuses lives outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum TransportStatus {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 413
    PayloadTooLarge,
    /// 422
    UnprocessableEntity,
    /// 429
    TooManyRequests,
    /// 500
    InternalServerError,
    /// 502
    BadGateway,
    /// 503
    ServiceUnavailable,
    /// 504
    GatewayTimeout,
}

impl TransportStatus {
    /// Numeric status code.
    pub const fn code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::PayloadTooLarge => 413,
            Self::UnprocessableEntity => 422,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
        }
    }

    /// Canonical reason phrase.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::UnprocessableEntity => "Unprocessable Entity",
            Self::TooManyRequests => "Too Many Requests",
            Self::InternalServerError => "Internal Server Error",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
        }
    }

    /// Look up a status by its numeric code.
    pub const fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            413 => Self::PayloadTooLarge,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            _ => return None,
        })
    }

    /// True for 5xx statuses.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.code() >= 500
    }
}

impl From<TransportStatus> for u16 {
    fn from(status: TransportStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for TransportStatus {
    type Error = UnknownStatus;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownStatus(code))
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// A numeric status with no [`TransportStatus`] counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported transport status {0}")]
pub struct UnknownStatus(pub u16);
