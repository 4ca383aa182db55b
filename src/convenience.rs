//! Boundary helpers: catalog definition macros and `Result` adapters.
//!
//! # Rules
//!
//! 1. **Codes are defined once, as consts** via [`define_error_codes!`]
//! 2. **Raw failures never cross a module boundary**: convert them with
//!    [`ResultExt::or_system_failure`] before returning
//!
//! ```rust
//! use faultline::{ResultExt, StructuredFailure, codes};
//! use std::io;
//!
//! fn read_settings() -> faultline::Result<String> {
//!     let raw: Result<String, io::Error> = Err(io::Error::other("disk gone"));
//!     raw.or_system_failure()
//! }
//!
//! let err = read_settings().unwrap_err();
//! assert!(err.is_caused_by(&codes::IO_ERROR));
//! ```

use crate::failure::StructuredFailure;
use crate::models::ErrorOrigin;
use std::error::Error;

/// Define a single catalog entry as a `pub const`.
///
/// ```rust
/// # use faultline::define_error_code;
/// define_error_code!(MISSING_HEADER, "Client.MISSING_HEADER");
/// assert_eq!(MISSING_HEADER.as_str(), "Client.MISSING_HEADER");
/// ```
#[macro_export]
macro_rules! define_error_code {
    ($(#[$meta:meta])* $name:ident, $code:expr) => {
        $(#[$meta])*
        pub const $name: $crate::ErrorCode = $crate::ErrorCode::const_new($code);
    };
}

/// Define several catalog entries at once. Attributes, doc comments
/// included, are passed through to each const.
///
/// ```rust
/// # use faultline::define_error_codes;
/// define_error_codes! {
///     /// The message signature did not verify.
///     SIGNATURE_INVALID = "SIGNATURE_INVALID",
///     TIMESTAMP_MISSING = "TIMESTAMP_MISSING",
/// }
/// assert_eq!(TIMESTAMP_MISSING.as_str(), "TIMESTAMP_MISSING");
/// ```
#[macro_export]
macro_rules! define_error_codes {
    ( $( $(#[$meta:meta])* $name:ident = $code:expr ),+ $(,)? ) => {
        $(
            $crate::define_error_code!($(#[$meta])* $name, $code);
        )+
    };
}

/// Converts arbitrary failures into structured ones at a boundary.
pub trait ResultExt<T> {
    /// Classify the error, passing structured failures through unchanged.
    fn or_system_failure(self) -> Result<T, StructuredFailure>;

    /// Classify the error and namespace its code under `origin`.
    ///
    /// The origin prefix is applied with [`StructuredFailure::with_prefix`],
    /// so a failure already carrying that prefix is left untouched.
    fn or_system_failure_from(self, origin: ErrorOrigin) -> Result<T, StructuredFailure>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    fn or_system_failure(self) -> Result<T, StructuredFailure> {
        self.map_err(StructuredFailure::system_exception)
    }

    fn or_system_failure_from(self, origin: ErrorOrigin) -> Result<T, StructuredFailure> {
        self.map_err(|e| {
            let prefix = origin.prefix().trim_end_matches('.');
            StructuredFailure::system_exception(e).with_prefix(&[prefix])
        })
    }
}
