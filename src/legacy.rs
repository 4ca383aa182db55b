//! The older coded-fault representation still raised by parts of the platform.
//!
//! A [`CodedFault`] is just a fault code, a fault string and an optional
//! source. New code should produce [`StructuredFailure`](crate::StructuredFailure)
//! values instead; the classifier wraps coded faults it meets and
//! [`StructuredFailure::to_coded_fault`](crate::StructuredFailure::to_coded_fault)
//! converts in the other direction for consumers that still expect this shape.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Legacy coded fault.
#[derive(Debug, Clone)]
pub struct CodedFault {
    fault_code: String,
    fault_string: Option<String>,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl CodedFault {
    /// Create a fault with a code and a human-readable fault string.
    pub fn new(fault_code: impl Into<String>, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: Some(fault_string.into()),
            source: None,
        }
    }

    /// Create a fault carrying only a code.
    pub fn from_code(fault_code: impl Into<String>) -> Self {
        Self {
            fault_code: fault_code.into(),
            fault_string: None,
            source: None,
        }
    }

    /// Attach the underlying failure.
    pub fn with_source(mut self, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        self.source = Some(Arc::from(source.into()));
        self
    }

    pub(crate) fn with_shared_source(mut self, source: Arc<dyn Error + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    /// The fault code.
    #[inline]
    pub fn fault_code(&self) -> &str {
        &self.fault_code
    }

    /// The fault string, if any.
    #[inline]
    pub fn fault_string(&self) -> Option<&str> {
        self.fault_string.as_deref()
    }

    /// Prefix the fault code with dot-joined segments.
    ///
    /// Unlike the structured form, the legacy fault always prepends; callers
    /// of this API historically relied on that.
    pub fn with_prefix(mut self, prefixes: &[&str]) -> Self {
        let prefix = prefixes.join(".");
        if !prefix.is_empty() {
            self.fault_code = format!("{prefix}.{}", self.fault_code);
        }
        self
    }
}

impl fmt::Display for CodedFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fault_string {
            Some(s) if !s.trim().is_empty() => write!(f, "{}: {}", self.fault_code, s),
            _ => f.write_str(&self.fault_code),
        }
    }
}

impl Error for CodedFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}
