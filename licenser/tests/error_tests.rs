use licenser::LicenseError;
use std::error::Error as _;
use std::path::PathBuf;

#[test]
fn error_display_key_errors() {
    let err = LicenseError::InvalidPrivateKey("bad pem".into());
    let msg = format!("{err}");
    assert!(msg.contains("invalid private key"));
    assert!(msg.contains("bad pem"));

    let err = LicenseError::InvalidPublicKey("bad pem".into());
    assert!(format!("{err}").contains("invalid public key"));

    assert_eq!(LicenseError::NoPublicKey.to_string(), "no public key provided");
}

#[test]
fn error_display_mode_and_content() {
    assert_eq!(
        LicenseError::GeneratorModeRequired.to_string(),
        "generator mode is required"
    );
    assert_eq!(
        LicenseError::CustomerRequired.to_string(),
        "customer name is required"
    );
    assert_eq!(
        LicenseError::AppIdRequired.to_string(),
        "application ID is required"
    );
    assert_eq!(
        LicenseError::NoServices.to_string(),
        "at least one service must be allowed"
    );
}

#[test]
fn error_display_expired() {
    let err = LicenseError::Expired(1_700_000_000);
    let msg = format!("{err}");
    assert!(msg.contains("expired"));
    assert!(msg.contains("1700000000"));
}

#[test]
fn error_display_signature() {
    assert!(format!("{}", LicenseError::InvalidSignature).contains("signature"));
    assert!(format!("{}", LicenseError::Signing("boom".into())).contains("boom"));
}

#[test]
fn io_error_names_path_and_keeps_source() {
    let err = LicenseError::Io {
        path: PathBuf::from("/tmp/license.json"),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };
    assert!(format!("{err}").contains("/tmp/license.json"));
    assert!(err.source().is_some());
}

#[test]
fn format_error_names_path_and_keeps_source() {
    let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = LicenseError::Format {
        path: PathBuf::from("broken.json"),
        source,
    };
    assert!(format!("{err}").contains("broken.json"));
    assert!(err.source().is_some());
}

#[test]
fn error_from_serde_json() {
    let serde_err: Result<serde_json::Value, _> = serde_json::from_str("not json");
    let license_err: LicenseError = serde_err.unwrap_err().into();
    assert!(format!("{license_err}").contains("serialization"));
}

#[test]
fn error_display_config() {
    let err = LicenseError::Config("unknown field".into());
    assert!(format!("{err}").contains("invalid configuration"));
}

#[test]
fn error_is_debug() {
    let err = LicenseError::NoServices;
    let _ = format!("{err:?}");
}
