//! Canonical template codes known to the core.
//!
//! The platform-wide catalog is external; this module holds only the entries
//! the classifier itself resolves to, plus [`ErrorCode::with_code`] for codes
//! that arrive at runtime (typically from legacy coded faults).
//!
//! # Code Format
//!
//! Codes are dot-segmented namespace paths. Built-in entries are a single
//! segment (`NETWORK_ERROR`); origins and prefixes add leading segments later
//! (`Server.ServerProxy.NETWORK_ERROR`).
//!
//! ```rust
//! use faultline::{codes, DeviationTemplate};
//!
//! assert_eq!(codes::NETWORK_ERROR.code(), "NETWORK_ERROR");
//! assert_eq!(codes::NETWORK_ERROR.to_string(), "NETWORK_ERROR");
//! ```

use crate::define_error_codes;
use crate::deviation::{Deviation, DeviationTemplate};
use std::borrow::Cow;
use std::fmt;

/// A catalog entry whose template takes its positional arguments verbatim.
///
/// Compile-time entries borrow a `'static` code; runtime entries own theirs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    code: Cow<'static, str>,
}

impl ErrorCode {
    /// Create an entry with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const contexts) if the code is empty or has
    /// an empty segment (`".X"`, `"X."`, `"X..Y"`).
    pub const fn const_new(code: &'static str) -> Self {
        assert!(is_well_formed(code), "Error code must be non-empty dot-separated segments");
        Self {
            code: Cow::Borrowed(code),
        }
    }

    /// Create an entry for a code only known at runtime.
    ///
    /// Legacy fault codes are reused verbatim, whatever their shape, as long as
    /// they are not blank. A blank code falls back to [`INTERNAL_ERROR`] so that
    /// a failure never ends up without a code.
    pub fn with_code(code: impl Into<String>) -> Self {
        let code = code.into();
        if code.trim().is_empty() {
            tracing::debug!("blank runtime error code replaced with INTERNAL_ERROR");
            return INTERNAL_ERROR;
        }
        Self {
            code: Cow::Owned(code),
        }
    }

    /// The code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.code
    }
}

impl DeviationTemplate for ErrorCode {
    #[inline]
    fn code(&self) -> &str {
        &self.code
    }

    fn build(&self, args: &[String]) -> Deviation {
        Deviation::new(self.code.clone(), args.iter().cloned())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

const fn is_well_formed(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut previous_dot = true;
    let mut i = 0;
    while i < bytes.len() {
        let is_dot = bytes[i] == b'.';
        if is_dot && previous_dot {
            return false;
        }
        previous_dot = is_dot;
        i += 1;
    }
    !previous_dot
}

// -----------------------------------------------------------------------------
// Codes resolved by the classifier
// -----------------------------------------------------------------------------
define_error_codes! {
    /// Unclassified failure; also the fallback for blank codes.
    INTERNAL_ERROR        = "INTERNAL_ERROR",
    /// Host lookup, URL, socket or address failure.
    NETWORK_ERROR         = "NETWORK_ERROR",
    /// Any other I/O failure.
    IO_ERROR              = "IO_ERROR",
    /// Certificate parsing or validation failed.
    INCORRECT_CERTIFICATE = "INCORRECT_CERTIFICATE",
    /// SOAP envelope could not be processed.
    INVALID_SOAP          = "INVALID_SOAP",
    /// XML could not be parsed.
    INVALID_XML           = "INVALID_XML",
    /// Multipart MIME content could not be parsed.
    MIME_PARSING_FAILED   = "MIME_PARSING_FAILED",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_codes_keep_their_text() {
        const CODE: ErrorCode = ErrorCode::const_new("Security.SIGNATURE_FAILED");
        assert_eq!(CODE.as_str(), "Security.SIGNATURE_FAILED");
        assert_eq!(CODE.code(), "Security.SIGNATURE_FAILED");
    }

    #[test]
    fn well_formed_rejects_empty_segments() {
        assert!(is_well_formed("A"));
        assert!(is_well_formed("A.B.C"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed(".A"));
        assert!(!is_well_formed("A."));
        assert!(!is_well_formed("A..B"));
    }

    #[test]
    fn runtime_code_is_reused_verbatim() {
        let code = ErrorCode::with_code("legacy.fault code");
        assert_eq!(code.as_str(), "legacy.fault code");
    }

    #[test]
    fn blank_runtime_code_becomes_internal_error() {
        assert_eq!(ErrorCode::with_code("  "), INTERNAL_ERROR);
        assert_eq!(ErrorCode::with_code(""), INTERNAL_ERROR);
    }

    #[test]
    fn template_forwards_arguments_as_metadata() {
        let deviation = IO_ERROR.build(&["disk".to_string(), "full".to_string()]);
        assert_eq!(deviation.code(), "IO_ERROR");
        assert_eq!(deviation.metadata(), ["disk", "full"]);
    }

    #[test]
    fn macro_passes_attributes_through() {
        define_error_codes! {
            /// Documented entry.
            #[allow(dead_code)]
            DOCUMENTED = "Local.DOCUMENTED",
            PLAIN = "Local.PLAIN",
        }

        assert_eq!(DOCUMENTED.as_str(), "Local.DOCUMENTED");
        assert_eq!(PLAIN.as_str(), "Local.PLAIN");
    }

    #[test]
    fn macro_batch_definition() {
        define_error_codes! {
            LOCAL_A = "Local.A",
            LOCAL_B = "Local.B",
        }

        assert_eq!(LOCAL_A.to_string(), "Local.A");
        assert_eq!(LOCAL_B.to_string(), "Local.B");
    }
}
