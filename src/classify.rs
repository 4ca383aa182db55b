//! Classification chain: maps arbitrary failures onto canonical codes.
//!
//! # Rule Order
//!
//! Rules are evaluated in order and the first match wins:
//!
//! | # | Failure | Code |
//! |---|---------|------|
//! | 1 | legacy [`CodedFault`] (or nested [`StructuredFailure`]) | its own code |
//! | 2 | unknown host, malformed URL, socket, unknown service, unresolved address | `NETWORK_ERROR` |
//! | 3 | any other `io::Error` not wrapping a [`TechnicalFailure`] | `IO_ERROR` |
//! | 4 | certificate validation | `INCORRECT_CERTIFICATE` |
//! | 5 | SOAP envelope | `INVALID_SOAP` |
//! | 6 | XML parsing | `INVALID_XML` |
//! | 7 | unmarshalling whose source is an accessor wrapper | classify that source |
//! | … | rules registered through [`ClassifierBuilder::rule`] | rule-defined |
//! | n | accessor wrapper around a coded fault | the wrapped code |
//! | – | anything else | `INTERNAL_ERROR` |
//!
//! An `io::Error` built around a [`TechnicalFailure`] is classified by the
//! wrapped kind. Name-lookup failures returned directly by
//! `ToSocketAddrs` carry an opaque kind and land on the I/O row; resolve
//! names with [`TechnicalFailure::resolve_host`] to get `NETWORK_ERROR`.
//!
//! # Optional Libraries
//!
//! Some third-party libraries hide the meaningful failure inside an opaque
//! wrapper. The core never names those types. Callers that use such a
//! library register a predicate instead:
//!
//! ```rust
//! use faultline::{ClassificationRule, Classifier, codes};
//! use std::error::Error;
//! use std::fmt;
//!
//! #[derive(Debug)]
//! struct MimeError;
//! impl fmt::Display for MimeError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         f.write_str("bad multipart boundary")
//!     }
//! }
//! impl Error for MimeError {}
//!
//! let classifier = Classifier::builder()
//!     .rule(ClassificationRule::mime_parsing(|e| e.is::<MimeError>()))
//!     .build();
//!
//! let failure = classifier.classify(MimeError);
//! assert!(failure.is_caused_by(&codes::MIME_PARSING_FAILED));
//! assert_eq!(failure.details(), Some("bad multipart boundary"));
//! ```

use crate::builder::FailureBuilder;
use crate::codes::{self, ErrorCode};
use crate::failure::StructuredFailure;
use crate::legacy::CodedFault;
use crate::models::FailureCategory;
use std::error::Error;
use std::fmt;
use std::io;
use std::net::{AddrParseError, ToSocketAddrs};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Borrowed failure as seen by rules.
pub type FailureRef<'a> = &'a (dyn Error + 'static);

type Predicate = Box<dyn Fn(FailureRef<'_>, &Classifier) -> bool + Send + Sync>;
type Resolver = Box<dyn Fn(FailureRef<'_>, &Classifier) -> ErrorCode + Send + Sync>;
type KindPredicate = Box<dyn Fn(FailureRef<'_>) -> bool + Send + Sync>;

static GLOBAL: OnceLock<Classifier> = OnceLock::new();

// ============================================================================
// Technical Failures
// ============================================================================

/// Technical failures raised by the platform's own plumbing.
///
/// `std::io::Error` and `std::net::AddrParseError` are recognized directly;
/// this enum covers the kinds the standard library has no type for.
#[derive(Debug, Error)]
pub enum TechnicalFailure {
    /// Host name could not be resolved.
    #[error("unknown host: {0}")]
    UnknownHost(String),
    /// A URL could not be parsed.
    #[error("malformed URL: {0}")]
    MalformedUrl(String),
    /// Socket-level failure (reset, refused, closed).
    #[error("socket failure: {0}")]
    Socket(String),
    /// The protocol or service is not supported by the peer.
    #[error("unknown service: {0}")]
    UnknownService(String),
    /// A socket address could not be resolved.
    #[error("unresolved address: {0}")]
    UnresolvedAddress(String),
    /// Certificate parsing or validation failed.
    #[error("certificate validation failed: {0}")]
    Certificate(String),
    /// SOAP envelope could not be processed.
    #[error("SOAP failure: {0}")]
    Soap(String),
    /// XML could not be parsed.
    #[error("XML parsing failed: {0}")]
    Xml(String),
    /// Binding a document to a typed value failed.
    #[error("unmarshalling failed: {message}")]
    Unmarshal {
        /// What went wrong.
        message: String,
        /// Underlying failure, often an accessor wrapper.
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl TechnicalFailure {
    /// Unmarshalling failure wrapping `source`.
    pub fn unmarshal(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::Unmarshal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Resolve `addr`, reporting failure as a network-family kind.
    ///
    /// The standard library reports name-lookup failures with an opaque
    /// `io::ErrorKind`, which the classifier treats as plain I/O. Resolving
    /// through this function yields [`UnknownHost`](Self::UnknownHost) for
    /// lookup failures and [`UnresolvedAddress`](Self::UnresolvedAddress) for
    /// malformed addresses, both of which classify as `NETWORK_ERROR`.
    ///
    /// ```rust
    /// use faultline::{StructuredFailure, TechnicalFailure, codes};
    ///
    /// let err = TechnicalFailure::resolve_host("no-port-here").unwrap_err();
    /// let failure = StructuredFailure::system_exception(err);
    /// assert!(failure.is_caused_by(&codes::NETWORK_ERROR));
    /// ```
    pub fn resolve_host<A>(addr: &A) -> Result<A::Iter, Self>
    where
        A: ToSocketAddrs + fmt::Display + ?Sized,
    {
        addr.to_socket_addrs().map_err(|err| {
            let message = format!("{addr}: {err}");
            match err.kind() {
                io::ErrorKind::InvalidInput => Self::UnresolvedAddress(message),
                _ => Self::UnknownHost(message),
            }
        })
    }

    /// True for the network family.
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::UnknownHost(_)
                | Self::MalformedUrl(_)
                | Self::Socket(_)
                | Self::UnknownService(_)
                | Self::UnresolvedAddress(_)
        )
    }
}

const fn is_network_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrInUse
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
    )
}

fn technical(err: FailureRef<'_>) -> Option<&TechnicalFailure> {
    if let Some(technical) = err.downcast_ref::<TechnicalFailure>() {
        return Some(technical);
    }
    // io::Error::other(TechnicalFailure::..) keeps its specific row
    err.downcast_ref::<io::Error>()
        .and_then(io::Error::get_ref)
        .and_then(|inner| inner.downcast_ref::<TechnicalFailure>())
}

fn is_network_failure(err: FailureRef<'_>) -> bool {
    if let Some(technical) = technical(err) {
        return technical.is_network();
    }
    if err.is::<AddrParseError>() {
        return true;
    }
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| is_network_kind(io_err.kind()))
}

/// An `io::Error` that does not wrap one of the more specific technical kinds.
fn is_plain_io(err: FailureRef<'_>) -> bool {
    err.is::<io::Error>() && technical(err).is_none()
}

fn is_technical(err: FailureRef<'_>, kind: fn(&TechnicalFailure) -> bool) -> bool {
    technical(err).is_some_and(kind)
}

/// Code carried by a legacy or structured failure.
fn carried_code(err: FailureRef<'_>) -> Option<&str> {
    if let Some(structured) = err.downcast_ref::<StructuredFailure>() {
        return Some(structured.code());
    }
    err.downcast_ref::<CodedFault>().map(CodedFault::fault_code)
}

// ============================================================================
// Rules
// ============================================================================

/// One row of the classification table: a predicate and a resolver.
pub struct ClassificationRule {
    name: &'static str,
    predicate: Predicate,
    resolve: Resolver,
}

impl ClassificationRule {
    /// Rule with full access to the classifier, for rules that recurse.
    pub fn new<P, R>(name: &'static str, predicate: P, resolve: R) -> Self
    where
        P: Fn(FailureRef<'_>, &Classifier) -> bool + Send + Sync + 'static,
        R: Fn(FailureRef<'_>, &Classifier) -> ErrorCode + Send + Sync + 'static,
    {
        Self {
            name,
            predicate: Box::new(predicate),
            resolve: Box::new(resolve),
        }
    }

    /// Rule that maps every matching failure to a fixed code.
    pub fn to_code<P>(name: &'static str, predicate: P, code: ErrorCode) -> Self
    where
        P: Fn(FailureRef<'_>) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |err, _| predicate(err), move |_, _| code.clone())
    }

    /// `MIME_PARSING_FAILED` for failures matching `predicate`.
    pub fn mime_parsing<P>(predicate: P) -> Self
    where
        P: Fn(FailureRef<'_>) -> bool + Send + Sync + 'static,
    {
        Self::to_code("mime-parsing", predicate, codes::MIME_PARSING_FAILED)
    }

    /// Rule name, used in logs.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this rule applies to `err`.
    pub fn matches(&self, err: FailureRef<'_>, classifier: &Classifier) -> bool {
        (self.predicate)(err, classifier)
    }

    fn resolve(&self, err: FailureRef<'_>, classifier: &Classifier) -> ErrorCode {
        (self.resolve)(err, classifier)
    }

    fn leading() -> Vec<Self> {
        vec![
            Self::new(
                "coded-fault",
                |err, _| carried_code(err).is_some(),
                |err, _| carried_code(err).map_or(codes::INTERNAL_ERROR, ErrorCode::with_code),
            ),
            Self::to_code("network", is_network_failure, codes::NETWORK_ERROR),
            Self::to_code("io", is_plain_io, codes::IO_ERROR),
            Self::to_code(
                "certificate",
                |err| is_technical(err, |t| matches!(t, TechnicalFailure::Certificate(_))),
                codes::INCORRECT_CERTIFICATE,
            ),
            Self::to_code(
                "soap",
                |err| is_technical(err, |t| matches!(t, TechnicalFailure::Soap(_))),
                codes::INVALID_SOAP,
            ),
            Self::to_code(
                "xml",
                |err| is_technical(err, |t| matches!(t, TechnicalFailure::Xml(_))),
                codes::INVALID_XML,
            ),
            Self::new(
                "unmarshal-accessor",
                |err, classifier| {
                    is_technical(err, |t| matches!(t, TechnicalFailure::Unmarshal { .. }))
                        && err
                            .source()
                            .is_some_and(|source| classifier.is_accessor_wrapper(source))
                },
                |err, classifier| {
                    err.source()
                        .map_or(codes::INTERNAL_ERROR, |source| classifier.resolve_code(source))
                },
            ),
        ]
    }

    fn trailing() -> Vec<Self> {
        vec![Self::new(
            "accessor-coded-fault",
            |err, classifier| {
                classifier.is_accessor_wrapper(err)
                    && err
                        .source()
                        .is_some_and(|source| carried_code(source).is_some())
            },
            |err, _| {
                err.source()
                    .and_then(carried_code)
                    .map_or(codes::INTERNAL_ERROR, ErrorCode::with_code)
            },
        )]
    }
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Ordered rule registry.
///
/// Immutable once built and safe to share; the process-wide instance is
/// available through [`Classifier::global`].
pub struct Classifier {
    rules: Vec<ClassificationRule>,
    accessor_wrappers: Vec<KindPredicate>,
}

impl Classifier {
    /// Built-in rules only.
    pub fn standard() -> Self {
        Self::builder().build()
    }

    /// Start configuring a classifier.
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder::default()
    }

    /// The installed classifier, or the standard one if none was installed.
    pub fn global() -> &'static Classifier {
        GLOBAL.get_or_init(Classifier::standard)
    }

    /// Install the process-wide classifier.
    ///
    /// Must happen before the first classification: once
    /// [`global`](Self::global) has been read the standard classifier is
    /// locked in.
    pub fn install(classifier: Classifier) -> Result<(), InstallError> {
        GLOBAL
            .set(classifier)
            .map_err(|_| InstallError::AlreadyInstalled)?;
        tracing::debug!("process-wide classifier installed");
        Ok(())
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(ClassificationRule::name)
    }

    /// Whether `err` is a registered accessor wrapper.
    pub fn is_accessor_wrapper(&self, err: FailureRef<'_>) -> bool {
        self.accessor_wrappers.iter().any(|predicate| predicate(err))
    }

    /// Resolve the canonical code for `err`.
    pub fn resolve_code(&self, err: FailureRef<'_>) -> ErrorCode {
        match self.rules.iter().find(|rule| rule.matches(err, self)) {
            Some(rule) => {
                let code = rule.resolve(err, self);
                tracing::debug!(rule = rule.name(), code = %code, "failure classified");
                code
            }
            None => {
                tracing::debug!(failure = %err, "no classification rule matched");
                codes::INTERNAL_ERROR
            }
        }
    }

    /// Turn any failure into a structured one.
    ///
    /// Structured failures are returned unchanged; coded faults keep their
    /// code; everything else goes through [`resolve_code`](Self::resolve_code).
    /// The result is always SYSTEM category.
    pub fn classify(&self, failure: impl Into<Box<dyn Error + Send + Sync>>) -> StructuredFailure {
        let failure: Box<dyn Error + Send + Sync> = failure.into();

        let failure = match failure.downcast::<StructuredFailure>() {
            Ok(structured) => {
                tracing::trace!(identifier = structured.identifier(), "already structured");
                return *structured;
            }
            Err(other) => other,
        };

        match failure.downcast::<CodedFault>() {
            Ok(fault) => {
                let code = ErrorCode::with_code(fault.fault_code());
                let builder = FailureBuilder::new(FailureCategory::System, code);
                let builder = match fault.fault_string() {
                    Some(details) => builder.details(details),
                    None => builder,
                };
                builder.cause(*fault).build()
            }
            Err(other) => {
                let code = self.resolve_code(&*other);
                let details = other.to_string();
                FailureBuilder::new(FailureCategory::System, code)
                    .details(details)
                    .shared_cause(Arc::from(other))
                    .build()
            }
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .field("accessor_wrappers", &self.accessor_wrappers.len())
            .finish()
    }
}

/// Configures a [`Classifier`].
#[derive(Default)]
#[must_use = "call `build` to obtain the classifier"]
pub struct ClassifierBuilder {
    extra: Vec<ClassificationRule>,
    accessor_wrappers: Vec<KindPredicate>,
}

impl ClassifierBuilder {
    /// Register a rule. Registered rules run after the built-in technical
    /// kinds and before the accessor fallback, in registration order.
    pub fn rule(mut self, rule: ClassificationRule) -> Self {
        self.extra.push(rule);
        self
    }

    /// Register a predicate recognizing an opaque accessor wrapper type.
    pub fn accessor_wrapper<P>(mut self, predicate: P) -> Self
    where
        P: Fn(FailureRef<'_>) -> bool + Send + Sync + 'static,
    {
        self.accessor_wrappers.push(Box::new(predicate));
        self
    }

    /// Assemble the rule list.
    pub fn build(self) -> Classifier {
        let mut rules = ClassificationRule::leading();
        rules.extend(self.extra);
        rules.extend(ClassificationRule::trailing());
        Classifier {
            rules,
            accessor_wrappers: self.accessor_wrappers,
        }
    }
}

/// Failure to install the process-wide classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InstallError {
    /// A classifier was installed, or the standard one was already in use.
    #[error("a process-wide classifier is already in place")]
    AlreadyInstalled,
}
