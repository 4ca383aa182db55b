//! Borrowed, structured view of a failure for logs and telemetry.
//!
//! # Properties
//!
//! - Borrows from the [`StructuredFailure`] with an explicit lifetime
//! - Cannot outlive the failure that produced it
//! - No allocation in accessors
//! - Free-text fields are truncated when written out
//!
//! The view is serializable, so a logging pipeline can ship it as JSON
//! without going through the rendered message.
//!
//! ```rust
//! use faultline::{StructuredFailure, codes};
//!
//! let err = StructuredFailure::system(&codes::IO_ERROR)
//!     .identifier("id1")
//!     .details("disk full")
//!     .build();
//!
//! let mut line = String::new();
//! err.log().write_to(&mut line).unwrap();
//! assert_eq!(line, "[id1] [SYSTEM] IO_ERROR details='disk full'");
//! ```

use crate::failure::StructuredFailure;
use crate::models::{ErrorOrigin, FailureCategory, TransportStatus};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;

/// Maximum length for any individual free-text field in written output.
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Appended to truncated fields.
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Structured log entry borrowed from a [`StructuredFailure`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FailureLog<'a> {
    identifier: &'a str,
    category: FailureCategory,
    code: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    metadata: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<TransportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<ErrorOrigin>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_cause"
    )]
    cause: Option<&'a (dyn Error + Send + Sync + 'static)>,
}

impl<'a> FailureLog<'a> {
    /// View over `failure`.
    pub fn new(failure: &'a StructuredFailure) -> Self {
        Self {
            identifier: failure.identifier(),
            category: failure.category(),
            code: failure.code(),
            metadata: failure.metadata(),
            details: failure.details(),
            status: failure.status(),
            origin: failure.origin(),
            cause: failure.cause(),
        }
    }

    /// Write a single log line without building intermediate strings for
    /// untruncated fields.
    ///
    /// ```text
    /// [<identifier>] [<CATEGORY>] <code> [status=<n>] [origin=<o>] [metadata='a, b'] [details='..'] [cause='..']
    /// ```
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.identifier, self.category, self.code)?;

        if let Some(status) = self.status {
            write!(f, " status={}", status.code())?;
        }

        if let Some(origin) = self.origin {
            write!(f, " origin={origin}")?;
        }

        if !self.metadata.is_empty() {
            write!(
                f,
                " metadata='{}'",
                truncate_with_indicator(&self.metadata.join(", "))
            )?;
        }

        if let Some(details) = self.details {
            write!(f, " details='{}'", truncate_with_indicator(details))?;
        }

        if let Some(cause) = self.cause {
            write!(f, " cause='{}'", truncate_with_indicator(&cause.to_string()))?;
        }

        Ok(())
    }

    /// Emit this entry as a `tracing` event at `level`.
    pub fn emit(&self, level: tracing::Level) {
        let mut line = String::new();
        if self.write_to(&mut line).is_err() {
            return;
        }

        macro_rules! event_at {
            ($mac:ident) => {
                tracing::$mac!(
                    identifier = self.identifier,
                    category = %self.category,
                    code = self.code,
                    status = self.status.map(|s| s.code()),
                    "{line}"
                )
            };
        }

        match level {
            tracing::Level::ERROR => event_at!(error),
            tracing::Level::WARN => event_at!(warn),
            tracing::Level::INFO => event_at!(info),
            tracing::Level::DEBUG => event_at!(debug),
            tracing::Level::TRACE => event_at!(trace),
        }
    }

    /// Correlation identifier.
    #[inline]
    pub const fn identifier(&self) -> &str {
        self.identifier
    }

    /// Failure category.
    #[inline]
    pub const fn category(&self) -> FailureCategory {
        self.category
    }

    /// Full, possibly prefixed, code.
    #[inline]
    pub const fn code(&self) -> &str {
        self.code
    }

    /// Ordered template metadata.
    #[inline]
    pub const fn metadata(&self) -> &[String] {
        self.metadata
    }

    /// Free-text details, untruncated.
    #[inline]
    pub const fn details(&self) -> Option<&str> {
        self.details
    }

    /// Transport status hint.
    #[inline]
    pub const fn status(&self) -> Option<TransportStatus> {
        self.status
    }

    /// Explicit origin, if recorded.
    #[inline]
    pub const fn origin(&self) -> Option<ErrorOrigin> {
        self.origin
    }

    /// The underlying failure, if any.
    #[inline]
    pub const fn cause(&self) -> Option<&'a (dyn Error + Send + Sync + 'static)> {
        self.cause
    }
}

fn serialize_cause<S: Serializer>(
    cause: &Option<&(dyn Error + Send + Sync + 'static)>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match cause {
        Some(cause) => serializer.collect_str(cause),
        None => serializer.serialize_none(),
    }
}

/// Truncate a field so one oversized message cannot flood the log.
///
/// Cuts at a UTF-8 boundary and marks the cut.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
