//! # Faultline
//!
//! Canonical structured failures for a message-exchange platform.
//!
//! ## Design Philosophy
//!
//! 1. **One failure type crosses module boundaries**: [`StructuredFailure`]
//! 2. **Codes are namespaced paths** (`Server.ServerProxy.NETWORK_ERROR`) so
//!    callers can ask "caused by what" and "coming from where"
//! 3. **Classification is a table, not a type hierarchy**: an ordered
//!    [`Classifier`] maps arbitrary failures onto canonical codes
//! 4. **Already-structured failures pass through untouched**, so answers stay
//!    stable however many layers a failure crosses
//! 5. **Details are zeroized** when the last handle drops
//!
//! ## Quick Start
//!
//! ```rust
//! use faultline::{ErrorOrigin, ResultExt, StructuredFailure, codes};
//! use std::io;
//!
//! fn fetch() -> faultline::Result<Vec<u8>> {
//!     let raw: Result<Vec<u8>, io::Error> =
//!         Err(io::Error::from(io::ErrorKind::ConnectionRefused));
//!     raw.or_system_failure_from(ErrorOrigin::ServerProxy)
//! }
//!
//! let err = fetch().unwrap_err();
//! assert_eq!(err.code(), "Server.ServerProxy.NETWORK_ERROR");
//! assert!(err.is_caused_by(&codes::NETWORK_ERROR));
//! assert!(err.originates_from(ErrorOrigin::ServerProxy));
//! assert!(err.originates_from(ErrorOrigin::Server));
//! ```
//!
//! ## Building Failures Directly
//!
//! ```rust
//! use faultline::{StructuredFailure, TransportStatus, define_error_codes};
//!
//! define_error_codes! {
//!     MEMBER_NOT_FOUND = "MEMBER_NOT_FOUND",
//! }
//!
//! let err = StructuredFailure::business(&MEMBER_NOT_FOUND)
//!     .identifier("req-42")
//!     .metadata_items(["EE/GOV/70000001"])
//!     .status(TransportStatus::NotFound)
//!     .build();
//!
//! assert_eq!(
//!     err.to_string(),
//!     "[req-42] [BUSINESS] MEMBER_NOT_FOUND (EE/GOV/70000001)"
//! );
//! ```
//!
//! ## Logging
//!
//! Failures never log themselves. Callers that want a log line take the
//! borrowed [`FailureLog`] view and emit it through `tracing`:
//!
//! ```rust
//! # use faultline::StructuredFailure;
//! let err = StructuredFailure::system_internal_error("unexpected state");
//! err.log().emit(tracing::Level::ERROR);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod classify;
pub mod codes;
pub mod convenience;
pub mod deviation;
pub mod failure;
pub mod legacy;
pub mod logging;
pub mod models;

pub use builder::FailureBuilder;
pub use classify::{
    ClassificationRule, Classifier, ClassifierBuilder, FailureRef, InstallError, TechnicalFailure,
};
pub use codes::ErrorCode;
pub use convenience::ResultExt;
pub use deviation::{Deviation, DeviationTemplate};
pub use failure::StructuredFailure;
pub use legacy::CodedFault;
pub use logging::FailureLog;
pub use models::{ErrorOrigin, FailureCategory, TransportStatus, UnknownStatus};

/// Result type for operations that fail with a [`StructuredFailure`].
pub type Result<T> = std::result::Result<T, StructuredFailure>;
