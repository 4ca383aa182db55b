//! The canonical structured failure value.
//!
//! # Key Properties
//!
//! - Immutable after construction; "modifying" always produces a new value
//! - Cheap to clone and safe to share across threads (`Arc` inside)
//! - Already-structured failures pass through classification unchanged, so
//!   `is_caused_by` / `originates_from` answers stay stable across layers
//! - Details are zeroized when the last handle drops
//!
//! # Message Format
//!
//! ```text
//! [<identifier>] [<CATEGORY>] <code>[ (<metadata, ...>)][: <details>]
//! ```
//!
//! ```rust
//! use faultline::{FailureCategory, StructuredFailure, codes};
//!
//! let err = StructuredFailure::system(&codes::IO_ERROR)
//!     .identifier("id1")
//!     .metadata_items(["a", "b"])
//!     .details("oops")
//!     .build();
//!
//! assert_eq!(err.to_string(), "[id1] [SYSTEM] IO_ERROR (a, b): oops");
//! assert_eq!(err.category(), FailureCategory::System);
//! ```

use crate::builder::FailureBuilder;
use crate::classify::Classifier;
use crate::codes::{self, ErrorCode};
use crate::deviation::{DeviationTemplate, MetadataVec};
use crate::legacy::CodedFault;
use crate::logging::FailureLog;
use crate::models::{ErrorOrigin, FailureCategory, TransportStatus};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroize;

/// Shared handle to an underlying failure.
pub(crate) type SharedCause = Arc<dyn Error + Send + Sync>;

/// Field storage behind a [`StructuredFailure`] handle.
pub(crate) struct FailureParts {
    pub(crate) identifier: String,
    pub(crate) category: FailureCategory,
    pub(crate) code: String,
    pub(crate) metadata: MetadataVec,
    pub(crate) details: Option<String>,
    pub(crate) status: Option<TransportStatus>,
    pub(crate) origin: Option<ErrorOrigin>,
    pub(crate) cause: Option<SharedCause>,
}

impl Drop for FailureParts {
    fn drop(&mut self) {
        if let Some(details) = self.details.as_mut() {
            details.zeroize();
        }
    }
}

/// Canonical, immutable error value.
///
/// Created through a [`FailureBuilder`] (see [`StructuredFailure::system`] and
/// friends) or by classifying an arbitrary failure with
/// [`StructuredFailure::system_exception`].
#[derive(Clone)]
#[must_use = "failures should be propagated or logged"]
pub struct StructuredFailure {
    inner: Arc<FailureParts>,
}

impl StructuredFailure {
    pub(crate) fn from_parts(parts: FailureParts) -> Self {
        debug_assert!(!parts.code.is_empty(), "structured failure code must not be empty");
        Self {
            inner: Arc::new(parts),
        }
    }

    // ------------------------------------------------------------------
    // Builder entry points
    // ------------------------------------------------------------------

    /// Start building a SYSTEM failure for a catalog entry.
    pub fn system<T: DeviationTemplate>(template: T) -> FailureBuilder<T> {
        FailureBuilder::new(FailureCategory::System, template)
    }

    /// Start building a BUSINESS failure for a catalog entry.
    pub fn business<T: DeviationTemplate>(template: T) -> FailureBuilder<T> {
        FailureBuilder::new(FailureCategory::Business, template)
    }

    /// Start building a VALIDATION failure for a catalog entry.
    pub fn validation<T: DeviationTemplate>(template: T) -> FailureBuilder<T> {
        FailureBuilder::new(FailureCategory::Validation, template)
    }

    // ------------------------------------------------------------------
    // Classification entry points
    // ------------------------------------------------------------------

    /// Classify an arbitrary failure with the process-wide [`Classifier`].
    ///
    /// - A `StructuredFailure` is returned as is (same instance).
    /// - A [`CodedFault`] becomes a SYSTEM failure reusing its code, with its
    ///   fault string as details and itself as cause.
    /// - Anything else is resolved through the classification rules; its
    ///   message becomes the details and it becomes the cause.
    pub fn system_exception(failure: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Classifier::global().classify(failure)
    }

    /// SYSTEM / `INTERNAL_ERROR` failure with the given details.
    pub fn system_internal_error(details: impl Into<String>) -> Self {
        Self::system(codes::INTERNAL_ERROR).details(details).build()
    }

    /// SYSTEM / `INTERNAL_ERROR` failure wrapping `cause`.
    ///
    /// When `cause` is already a `StructuredFailure` it is returned unchanged
    /// and `details` is ignored.
    pub fn system_internal_error_with_cause(
        details: impl Into<String>,
        cause: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        let cause: Box<dyn Error + Send + Sync> = cause.into();
        match cause.downcast::<StructuredFailure>() {
            Ok(structured) => *structured,
            Err(cause) => Self::system(codes::INTERNAL_ERROR)
                .details(details)
                .shared_cause(Arc::from(cause))
                .build(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Unique identifier, used to correlate log lines.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    /// Failure category.
    #[inline]
    pub fn category(&self) -> FailureCategory {
        self.inner.category
    }

    /// Full, possibly prefixed, code.
    #[inline]
    pub fn code(&self) -> &str {
        &self.inner.code
    }

    /// Ordered template metadata.
    #[inline]
    pub fn metadata(&self) -> &[String] {
        &self.inner.metadata
    }

    /// Free-text details. Blank details are never stored.
    #[inline]
    pub fn details(&self) -> Option<&str> {
        self.inner.details.as_deref()
    }

    /// Transport status hint.
    #[inline]
    pub fn status(&self) -> Option<TransportStatus> {
        self.inner.status
    }

    /// Explicit origin, if one was recorded at build time.
    #[inline]
    pub fn origin(&self) -> Option<ErrorOrigin> {
        self.inner.origin
    }

    /// The wrapped failure.
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.inner.cause.as_deref()
    }

    /// The wrapped failure, when it is itself structured.
    pub fn structured_cause(&self) -> Option<&StructuredFailure> {
        self.cause()
            .and_then(|cause| cause.downcast_ref::<StructuredFailure>())
    }

    /// Legacy accessor: same as [`code`](Self::code).
    #[inline]
    pub fn fault_code(&self) -> &str {
        self.code()
    }

    /// Legacy accessor: same as [`details`](Self::details).
    #[inline]
    pub fn fault_string(&self) -> Option<&str> {
        self.details()
    }

    /// Rendered message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// True when both handles point at the same underlying failure.
    #[inline]
    pub fn is_same_instance(&self, other: &StructuredFailure) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Whether this failure was caused by the given catalog entry.
    ///
    /// Matches the exact code or a trailing dot-separated segment path, so
    /// `A.B.NETWORK_ERROR` is caused by `NETWORK_ERROR` and by
    /// `B.NETWORK_ERROR`, but not by `B` or `WORK_ERROR`.
    pub fn is_caused_by<T: DeviationTemplate + ?Sized>(&self, expected: &T) -> bool {
        self.is_caused_by_code(expected.code())
    }

    /// [`is_caused_by`](Self::is_caused_by) for a plain code string.
    pub fn is_caused_by_code(&self, expected: &str) -> bool {
        let code = self.code();
        code == expected
            || code
                .strip_suffix(expected)
                .is_some_and(|rest| rest.ends_with('.'))
    }

    /// Whether this failure belongs to `expected`'s namespace.
    ///
    /// An explicit origin decides on its own; only when none was recorded is
    /// the code tested against the origin prefix.
    pub fn originates_from(&self, expected: ErrorOrigin) -> bool {
        match self.inner.origin {
            Some(origin) => origin == expected,
            None => self.code().starts_with(expected.prefix()),
        }
    }

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    /// Namespace the code under dot-joined `prefixes`.
    ///
    /// Returns this same instance when the code already starts with the joined
    /// prefix; otherwise a new failure whose code is `prefix.code` and whose
    /// other fields (identifier and cause included) are unchanged.
    pub fn with_prefix(&self, prefixes: &[&str]) -> StructuredFailure {
        let prefix = prefixes.join(".");
        if self.code().starts_with(&prefix) {
            return self.clone();
        }
        let inner = &self.inner;
        Self::from_parts(FailureParts {
            identifier: inner.identifier.clone(),
            category: inner.category,
            code: format!("{prefix}.{}", inner.code),
            metadata: inner.metadata.clone(),
            details: inner.details.clone(),
            status: inner.status,
            origin: inner.origin,
            cause: inner.cause.clone(),
        })
    }

    /// Convert to the legacy coded-fault shape.
    ///
    /// The fault keeps this failure as its source, so nothing is lost for
    /// consumers that walk the source chain.
    pub fn to_coded_fault(&self) -> CodedFault {
        let fault = match self.details() {
            Some(details) => CodedFault::new(self.code(), details),
            None => CodedFault::from_code(self.code()),
        };
        fault.with_shared_source(Arc::new(self.clone()))
    }

    /// Borrowed structured view for logging and telemetry.
    #[inline]
    pub fn log(&self) -> FailureLog<'_> {
        FailureLog::new(self)
    }

    /// Callback form of [`log`](Self::log); the view cannot escape `f`.
    #[inline]
    pub fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&FailureLog<'_>) -> R,
    {
        let log = self.log();
        f(&log)
    }
}

impl From<ErrorCode> for StructuredFailure {
    /// SYSTEM failure for a bare catalog entry.
    fn from(code: ErrorCode) -> Self {
        Self::system(code).build()
    }
}

impl fmt::Display for StructuredFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identifier = match self.identifier() {
            "" => "unknown",
            id => id,
        };
        write!(f, "[{}] [{}] {}", identifier, self.category(), self.code())?;

        let metadata = self.metadata();
        if !metadata.is_empty() {
            write!(f, " ({})", metadata.join(", "))?;
        }

        if let Some(details) = self.details().filter(|d| !d.trim().is_empty()) {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for StructuredFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredFailure")
            .field("identifier", &self.identifier())
            .field("category", &self.category())
            .field("code", &self.code())
            .field("metadata", &self.metadata())
            .field("details", &self.details())
            .field("status", &self.status())
            .field("origin", &self.origin())
            .field("cause", &self.cause().map(|c| c.to_string()))
            .finish()
    }
}

impl Error for StructuredFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner
            .cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}
