//! Catalog entries and the `{code, metadata}` pairs they produce.
//!
//! The full catalog of canonical codes and message templates lives outside
//! this crate. This module only fixes the capability the core consumes:
//! a [`DeviationTemplate`] knows its canonical code and can turn a positional
//! argument list into a [`Deviation`].

use smallvec::SmallVec;
use std::fmt;

/// Inline capacity for positional metadata. Most templates take two or fewer
/// arguments.
pub(crate) type MetadataVec = SmallVec<[String; 4]>;

/// A code plus the positional metadata its message template expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deviation {
    code: String,
    metadata: MetadataVec,
}

impl Deviation {
    /// Create a deviation from a code and its ordered metadata.
    pub fn new<I, S>(code: impl Into<String>, metadata: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.into(),
            metadata: metadata.into_iter().map(Into::into).collect(),
        }
    }

    /// The template code this deviation was produced for.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Ordered values for the template placeholders.
    #[inline]
    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    pub(crate) fn into_metadata(self) -> MetadataVec {
        self.metadata
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)?;
        if !self.metadata.is_empty() {
            write!(f, " ({})", self.metadata.join(", "))?;
        }
        Ok(())
    }
}

/// A catalog entry: a canonical code and the rule for formatting its
/// arguments.
///
/// Argument arity and formatting are a contract between the entry and its
/// callers; the core forwards whatever the caller supplied and keeps only the
/// metadata of the resulting [`Deviation`].
pub trait DeviationTemplate {
    /// Canonical, dot-segmented code of this entry.
    fn code(&self) -> &str;

    /// Format positional arguments into a deviation.
    fn build(&self, args: &[String]) -> Deviation;
}

impl<T: DeviationTemplate + ?Sized> DeviationTemplate for &T {
    #[inline]
    fn code(&self) -> &str {
        (**self).code()
    }

    #[inline]
    fn build(&self, args: &[String]) -> Deviation {
        (**self).build(args)
    }
}

impl<T: DeviationTemplate + ?Sized> DeviationTemplate for Box<T> {
    #[inline]
    fn code(&self) -> &str {
        (**self).code()
    }

    #[inline]
    fn build(&self, args: &[String]) -> Deviation {
        (**self).build(args)
    }
}
