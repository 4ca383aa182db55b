//! Property-based tests for faultline
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use faultline::{
    ClassificationRule, Classifier, CodedFault, ErrorCode, ErrorOrigin, FailureCategory,
    InstallError, ResultExt, StructuredFailure, TechnicalFailure, codes,
};
use proptest::prelude::*;
use std::error::Error;
use std::fmt;
use std::io;

// ============================================================================
// STRATEGIES
// ============================================================================

fn segment() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z_]{0,8}"
}

fn code_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|segments| segments.join("."))
}

fn category() -> impl Strategy<Value = FailureCategory> {
    prop_oneof![
        Just(FailureCategory::System),
        Just(FailureCategory::Business),
        Just(FailureCategory::Validation),
    ]
}

fn origin() -> impl Strategy<Value = ErrorOrigin> {
    prop::sample::select(ErrorOrigin::ALL.to_vec())
}

fn build(category: FailureCategory, code: &str) -> StructuredFailure {
    let template = ErrorCode::with_code(code);
    match category {
        FailureCategory::System => StructuredFailure::system(template),
        FailureCategory::Business => StructuredFailure::business(template),
        FailureCategory::Validation => StructuredFailure::validation(template),
    }
    .identifier("id1")
    .build()
}

/// Opaque wrapper standing in for a third-party accessor failure.
#[derive(Debug)]
struct AccessorFailure(Box<dyn Error + Send + Sync>);

impl fmt::Display for AccessorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "accessor: {}", self.0)
    }
}

impl Error for AccessorFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref())
    }
}

fn with_accessor() -> Classifier {
    Classifier::builder()
        .accessor_wrapper(|e| e.is::<AccessorFailure>())
        .build()
}

// ============================================================================
// RENDERING PROPERTIES
// ============================================================================

proptest! {
    /// Rendered message follows `[id] [CATEGORY] code (meta): details`
    #[test]
    fn message_format_is_stable(
        category in category(),
        code in code_path(),
        metadata in prop::collection::vec("[a-z0-9]{1,6}", 0..4),
        details in "[a-z ]{0,20}",
    ) {
        let err = match category {
            FailureCategory::System => StructuredFailure::system(ErrorCode::with_code(code.as_str())),
            FailureCategory::Business => StructuredFailure::business(ErrorCode::with_code(code.as_str())),
            FailureCategory::Validation => StructuredFailure::validation(ErrorCode::with_code(code.as_str())),
        }
        .identifier("id1")
        .metadata_items(metadata.iter())
        .details(details.as_str())
        .build();

        let mut expected = format!("[id1] [{}] {}", category.as_str(), code);
        if !metadata.is_empty() {
            expected.push_str(&format!(" ({})", metadata.join(", ")));
        }
        if !details.trim().is_empty() {
            expected.push_str(&format!(": {details}"));
        }

        prop_assert_eq!(err.to_string(), expected);
    }

    /// Log lines are valid UTF-8 and bounded whatever the details
    #[test]
    fn log_output_is_bounded(details in "\\PC{0,10000}") {
        let err = StructuredFailure::system_internal_error(details);
        let mut buffer = String::new();
        err.log().write_to(&mut buffer).unwrap();

        assert!(std::str::from_utf8(buffer.as_bytes()).is_ok());
        assert!(buffer.len() < 2048);
    }
}

// ============================================================================
// MATCHING PROPERTIES
// ============================================================================

proptest! {
    /// A code is caused by every trailing segment path of itself
    #[test]
    fn caused_by_every_segment_suffix(
        category in category(),
        segments in prop::collection::vec(segment(), 1..5),
    ) {
        let err = build(category, &segments.join("."));
        for start in 0..segments.len() {
            let suffix = segments[start..].join(".");
            prop_assert!(err.is_caused_by_code(&suffix), "{} by {}", err.code(), suffix);
        }
    }

    /// Partial segments never match
    #[test]
    fn caused_by_rejects_partial_segments(
        head in segment(),
        tail in "[A-Z]{2,8}",
    ) {
        let err = build(FailureCategory::System, &format!("{head}.{tail}"));
        prop_assert!(!err.is_caused_by_code(&tail[1..]));
    }

    /// Without an explicit origin, the code prefix decides
    #[test]
    fn origin_follows_code_prefix(origin in origin(), code in code_path()) {
        let err = build(FailureCategory::System, &format!("{}{}", origin.prefix(), code));
        prop_assert!(err.originates_from(origin));
    }

    /// An explicit origin decides on its own
    #[test]
    fn explicit_origin_is_authoritative(
        origin in origin(),
        other in origin(),
        code in code_path(),
    ) {
        let err = StructuredFailure::system(ErrorCode::with_code(code))
            .origin(origin)
            .build();
        prop_assert!(err.originates_from(origin));
        prop_assert_eq!(err.originates_from(other), origin == other);
    }
}

// ============================================================================
// PREFIX PROPERTIES
// ============================================================================

proptest! {
    /// Applying the same prefix twice equals applying it once
    #[test]
    fn prefix_is_idempotent(
        code in code_path(),
        prefixes in prop::collection::vec(segment(), 1..3),
    ) {
        let parts: Vec<&str> = prefixes.iter().map(String::as_str).collect();
        let once = build(FailureCategory::Business, &code).with_prefix(&parts);
        let twice = once.with_prefix(&parts);

        prop_assert_eq!(twice.code(), once.code());
        prop_assert!(twice.is_same_instance(&once));
        prop_assert!(once.is_caused_by_code(&code));
    }

    /// Prefixing never changes identifier, category or metadata
    #[test]
    fn prefix_preserves_fields(
        category in category(),
        code in code_path(),
        prefix in segment(),
    ) {
        let err = build(category, &code);
        let prefixed = err.with_prefix(&[prefix.as_str()]);
        prop_assert_eq!(prefixed.identifier(), err.identifier());
        prop_assert_eq!(prefixed.category(), err.category());
        prop_assert_eq!(prefixed.metadata(), err.metadata());
    }
}

// ============================================================================
// CLASSIFICATION PROPERTIES
// ============================================================================

proptest! {
    /// Structured failures pass through classification unchanged
    #[test]
    fn classification_passes_structured_through(
        category in category(),
        code in code_path(),
    ) {
        let original = build(category, &code);
        let classified = StructuredFailure::system_exception(original.clone());
        prop_assert!(classified.is_same_instance(&original));
        prop_assert_eq!(classified.category(), category);
    }

    /// Legacy coded faults keep their code and fault string
    #[test]
    fn coded_faults_keep_code(code in code_path(), text in "[a-z]{1,12}") {
        let err = StructuredFailure::system_exception(CodedFault::new(code.as_str(), text.as_str()));
        prop_assert_eq!(err.category(), FailureCategory::System);
        prop_assert_eq!(err.code(), code.as_str());
        prop_assert_eq!(err.details(), Some(text.as_str()));
    }

    /// Every non-network io error is an IO_ERROR
    #[test]
    fn plain_io_errors_are_io_error(message in "[a-z ]{1,20}") {
        let err = StructuredFailure::system_exception(io::Error::other(message));
        prop_assert!(err.is_caused_by(&codes::IO_ERROR));
    }

    /// Unknown hosts are network errors
    #[test]
    fn unknown_host_is_network_error(host in "[a-z]{1,10}\\.[a-z]{2,3}") {
        let err = StructuredFailure::system_exception(TechnicalFailure::UnknownHost(host));
        prop_assert!(err.is_caused_by(&codes::NETWORK_ERROR));
    }

    /// Accessor wrappers around coded faults reuse the wrapped code
    #[test]
    fn accessor_wrapper_reuses_coded_fault(code in code_path()) {
        let wrapper = AccessorFailure(Box::new(CodedFault::from_code(code.as_str())));
        let err = with_accessor().classify(wrapper);
        prop_assert_eq!(err.code(), code.as_str());
    }

    /// Origin helper prefixes classified codes exactly once
    #[test]
    fn origin_helper_prefixes_once(origin in origin()) {
        let first: Result<(), io::Error> = Err(io::Error::other("x"));
        let err = first.or_system_failure_from(origin).unwrap_err();
        prop_assert_eq!(err.code(), format!("{}IO_ERROR", origin.prefix()));

        let second: Result<(), StructuredFailure> = Err(err.clone());
        let again = second.or_system_failure_from(origin).unwrap_err();
        prop_assert!(again.is_same_instance(&err));
    }
}

// ============================================================================
// FIXED SCENARIOS
// ============================================================================

#[derive(Debug)]
struct Unrecognized;

impl fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unrecognized")
    }
}

impl Error for Unrecognized {}

#[test]
fn unknown_failures_become_internal_error() {
    let err = StructuredFailure::system_exception(Unrecognized);
    assert!(err.is_caused_by(&codes::INTERNAL_ERROR));
    assert_eq!(err.details(), Some("unrecognized"));
}

#[test]
fn accessor_wrapper_c2_scenario() {
    let wrapper = AccessorFailure(Box::new(CodedFault::new("C2", "inner")));
    assert_eq!(with_accessor().classify(wrapper).code(), "C2");
}

#[test]
fn registered_rules_run_before_accessor_fallback() {
    let classifier = Classifier::builder()
        .accessor_wrapper(|e| e.is::<AccessorFailure>())
        .rule(ClassificationRule::to_code(
            "accessor-override",
            |e| e.is::<AccessorFailure>(),
            ErrorCode::with_code("OVERRIDE"),
        ))
        .build();
    let wrapper = AccessorFailure(Box::new(CodedFault::from_code("C2")));
    assert_eq!(classifier.classify(wrapper).code(), "OVERRIDE");
}

#[test]
fn install_after_first_use_is_rejected() {
    let _ = Classifier::global();
    assert_eq!(
        Classifier::install(Classifier::standard()),
        Err(InstallError::AlreadyInstalled)
    );
}

#[test]
fn coded_fault_round_trip_keeps_source() {
    let err = StructuredFailure::system(&codes::INVALID_XML)
        .details("unclosed tag")
        .build();
    let fault = err.to_coded_fault();
    assert_eq!(fault.to_string(), "INVALID_XML: unclosed tag");

    let back = StructuredFailure::system_exception(fault);
    assert_eq!(back.code(), "INVALID_XML");
    assert_eq!(back.details(), Some("unclosed tag"));
}
