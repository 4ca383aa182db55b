use faultline::{
    ClassificationRule, Classifier, CodedFault, ErrorOrigin, ResultExt, StructuredFailure,
    TechnicalFailure, TransportStatus, codes, define_error_codes,
};
use std::error::Error;
use std::fmt;
use std::io;

define_error_codes! {
    MEMBER_NOT_FOUND = "MEMBER_NOT_FOUND",
}

#[derive(Debug)]
struct MultipartError(&'static str);

impl fmt::Display for MultipartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "multipart: {}", self.0)
    }
}

impl Error for MultipartError {}

fn call_backend(addr: &str) -> faultline::Result<Vec<u8>> {
    let mut addrs =
        TechnicalFailure::resolve_host(addr).or_system_failure_from(ErrorOrigin::ServerProxy)?;
    match addrs.next() {
        Some(_) => Ok(Vec::new()),
        None => Err(StructuredFailure::system_internal_error("no addresses resolved")),
    }
}

fn lookup_member(id: &str) -> faultline::Result<()> {
    Err(StructuredFailure::business(&MEMBER_NOT_FOUND)
        .metadata_items([id])
        .status(TransportStatus::NotFound)
        .build())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Must happen before anything is classified.
    let classifier = Classifier::builder()
        .rule(ClassificationRule::mime_parsing(|e| e.is::<MultipartError>()))
        .build();
    if let Err(e) = Classifier::install(classifier) {
        eprintln!("classifier not installed: {e}");
    }

    println!("--- Basic Usage Example ---\n");

    println!("1. Technical failure crossing a proxy boundary");
    if let Err(err) = call_backend("backend.invalid:443") {
        println!("   {err}");
        println!("   caused by NETWORK_ERROR: {}", err.is_caused_by(&codes::NETWORK_ERROR));
        println!("   from ServerProxy:        {}", err.originates_from(ErrorOrigin::ServerProxy));
        err.log().emit(tracing::Level::WARN);
    }

    println!("\n2. Business failure built directly");
    if let Err(err) = lookup_member("EE/GOV/70000001") {
        println!("   {err}");
        println!("   status hint: {:?}", err.status());
    }

    println!("\n3. Legacy coded fault");
    let err = StructuredFailure::system_exception(CodedFault::new("Signer.KEY_NOT_FOUND", "no key"));
    println!("   {err}");
    println!("   from Signer: {}", err.originates_from(ErrorOrigin::Signer));

    println!("\n4. Registered library failure");
    let err = StructuredFailure::system_exception(MultipartError("boundary missing"));
    println!("   {err}");

    println!("\n5. Plain I/O failure, as JSON");
    let err = StructuredFailure::system_exception(io::Error::other("disk full"));
    match serde_json::to_string_pretty(&err.log()) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("serialization failed: {e}"),
    }
}
