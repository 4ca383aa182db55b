//! Fluent, single-use assembly of [`StructuredFailure`] values.
//!
//! # Purpose
//!
//! The builder resolves the final code and metadata of a failure:
//!
//! - Code: `origin.prefix() + template.code()` when an origin is set, else the
//!   template code alone
//! - Metadata: whatever the template produces from the supplied metadata items
//!   (the template's own code in that result is not used)
//! - Identifier: a random UUID unless one was supplied
//!
//! # Single Use
//!
//! Every setter takes and returns the builder by value and [`build`] consumes
//! it, so a configured builder can produce exactly one failure. Reuse is a
//! compile error rather than a runtime surprise.
//!
//! ```rust
//! use faultline::{ErrorOrigin, StructuredFailure, TransportStatus, codes};
//!
//! let err = StructuredFailure::system(&codes::NETWORK_ERROR)
//!     .origin(ErrorOrigin::ServerProxy)
//!     .metadata_items(["backend.example.org"])
//!     .status(TransportStatus::BadGateway)
//!     .build();
//!
//! assert_eq!(err.code(), "Server.ServerProxy.NETWORK_ERROR");
//! assert_eq!(err.metadata(), ["backend.example.org"]);
//! assert!(!err.identifier().is_empty());
//! ```
//!
//! [`build`]: FailureBuilder::build

use crate::codes;
use crate::deviation::{DeviationTemplate, MetadataVec};
use crate::failure::{FailureParts, SharedCause, StructuredFailure};
use crate::models::{ErrorOrigin, FailureCategory, TransportStatus};
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

/// Single-use builder for [`StructuredFailure`].
///
/// Category and catalog entry are fixed at creation; everything else is
/// optional.
#[must_use = "a builder does nothing until `build` is called"]
pub struct FailureBuilder<T: DeviationTemplate> {
    category: FailureCategory,
    template: T,
    cause: Option<SharedCause>,
    identifier: Option<String>,
    metadata_items: MetadataVec,
    details: Option<String>,
    status: Option<TransportStatus>,
    origin: Option<ErrorOrigin>,
}

impl<T: DeviationTemplate> FailureBuilder<T> {
    /// Create a builder for `category` and catalog entry `template`.
    pub fn new(category: FailureCategory, template: T) -> Self {
        Self {
            category,
            template,
            cause: None,
            identifier: None,
            metadata_items: MetadataVec::new(),
            details: None,
            status: None,
            origin: None,
        }
    }

    /// Set the underlying failure.
    pub fn cause(self, cause: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        self.shared_cause(Arc::from(cause.into()))
    }

    pub(crate) fn shared_cause(mut self, cause: SharedCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Use a caller-supplied identifier instead of a generated one.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Positional arguments handed to the catalog entry at build time.
    pub fn metadata_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.metadata_items = items.into_iter().map(|item| item.to_string()).collect();
        self
    }

    /// Free-text details. Blank text is treated as absent.
    pub fn details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        self.details = (!details.trim().is_empty()).then_some(details);
        self
    }

    /// Transport status hint.
    pub fn status(mut self, status: TransportStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Namespace the code under `origin` and record it explicitly.
    pub fn origin(mut self, origin: ErrorOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Construct the failure, consuming the builder.
    pub fn build(self) -> StructuredFailure {
        let identifier = self
            .identifier
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let code = resolve_code(self.template.code(), self.origin);
        let metadata = self.template.build(&self.metadata_items).into_metadata();

        StructuredFailure::from_parts(FailureParts {
            identifier,
            category: self.category,
            code,
            metadata,
            details: self.details,
            status: self.status,
            origin: self.origin,
            cause: self.cause,
        })
    }
}

fn resolve_code(template_code: &str, origin: Option<ErrorOrigin>) -> String {
    let fallback = codes::INTERNAL_ERROR;
    let base = if template_code.trim().is_empty() {
        tracing::warn!("catalog entry with blank code; using INTERNAL_ERROR");
        fallback.as_str()
    } else {
        template_code
    };

    match origin {
        Some(origin) => format!("{}{}", origin.prefix(), base),
        None => base.to_owned(),
    }
}
