mod common;

use common::{full_license, generator, minimal_license, now, validator};
use licenser::{
    APP_ID_REQUIRED, CUSTOMER_REQUIRED, LICENSE_EXPIRED_ERROR, License, LicenseError, Manager,
    ManagerConfig, SERVICE_REQUIRED, SIGNATURE_VERIFICATION_FAILED, storage,
};
use pretty_assertions::assert_eq;

#[test]
fn save_and_load_license() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    let manager = generator();
    let signed = manager.generate(&full_license()).unwrap();

    manager.save_license(&signed, &path).unwrap();
    let loaded = manager.load_license(&path).unwrap();
    assert_eq!(loaded, signed);
}

#[test]
fn load_and_validate_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    let signed = generator().generate(&full_license()).unwrap();
    generator().save_license(&signed, &path).unwrap();

    let (loaded, result) = validator().load_and_validate(&path).unwrap();
    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(loaded.data.customer, "Acme Corporation");
}

#[test]
fn load_and_validate_reports_expired_as_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("expired.json");
    let license = License {
        expires_at: now() - 10,
        ..minimal_license()
    };
    let signed = generator().generate(&license).unwrap();
    generator().save_license(&signed, &path).unwrap();

    let (_, result) = validator().load_and_validate(&path).unwrap();
    assert!(!result.valid);
    assert_eq!(result.errors, vec![LICENSE_EXPIRED_ERROR.to_string()]);
}

#[test]
fn edited_file_fails_signature() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    let signed = generator().generate(&full_license()).unwrap();
    generator().save_license(&signed, &path).unwrap();

    let mut json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    json["data"]["limits"]["api_calls"] = serde_json::json!(99_999);
    std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

    let (_, result) = validator().load_and_validate(&path).unwrap();
    assert_eq!(result.errors, vec![SIGNATURE_VERIFICATION_FAILED.to_string()]);
}

#[test]
fn missing_file_is_io_error_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");
    let err = validator().load_and_validate(&path).unwrap_err();
    match err {
        LicenseError::Io { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn garbage_file_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, "invalid json content").unwrap();
    assert!(matches!(
        validator().load_license(&path),
        Err(LicenseError::Format { .. })
    ));
}

#[test]
fn truncated_file_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.json");
    let signed = generator().generate(&full_license()).unwrap();
    let bytes = storage::encode_license(&signed).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        validator().load_and_validate(&path),
        Err(LicenseError::Format { .. })
    ));
}

#[test]
fn wire_format_field_names() {
    let signed = generator().generate(&full_license()).unwrap();
    let json: serde_json::Value =
        serde_json::from_slice(&storage::encode_license(&signed).unwrap()).unwrap();

    for key in ["data", "signature", "key_id", "algorithm", "created_at"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    let data = &json["data"];
    for key in [
        "customer",
        "app_id",
        "services",
        "limits",
        "features",
        "issued_at",
        "expires_at",
        "metadata",
        "version",
        "environment",
    ] {
        assert!(data.get(key).is_some(), "missing data.{key}");
    }
    assert_eq!(data["services"][0]["description"], "REST API access");
}

#[test]
fn decode_minimal_wire_record() {
    let json = br#"{
        "data": { "customer": "C", "app_id": "A", "services": [{"id": "s", "name": "S"}], "issued_at": 1 },
        "signature": "AAAA",
        "created_at": 2
    }"#;
    let license = storage::decode_license(json).unwrap();
    assert_eq!(license.data.expires_at, 0);
    assert!(license.key_id.is_empty());
    assert!(license.algorithm.is_empty());
}

#[test]
fn missing_fields_are_judged_by_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.json");
    std::fs::write(
        &path,
        r#"{"data":{"app_id":"A","services":[{"id":"s","name":"S"}],"issued_at":1},"signature":"AAAA","created_at":2}"#,
    )
    .unwrap();

    let (loaded, result) = validator().load_and_validate(&path).unwrap();
    assert!(loaded.data.customer.is_empty());
    assert!(!result.valid);
    assert_eq!(
        result.errors,
        vec![
            SIGNATURE_VERIFICATION_FAILED.to_string(),
            CUSTOMER_REQUIRED.to_string(),
        ]
    );
}

#[test]
fn missing_signature_and_app_id_are_judged_by_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unsigned.json");
    std::fs::write(
        &path,
        r#"{"data":{"customer":"C","services":[{"id":"s","name":"S"}],"issued_at":1},"created_at":2}"#,
    )
    .unwrap();

    let (loaded, result) = validator().load_and_validate(&path).unwrap();
    assert!(loaded.signature.is_empty());
    assert_eq!(
        result.errors,
        vec![
            SIGNATURE_VERIFICATION_FAILED.to_string(),
            APP_ID_REQUIRED.to_string(),
        ]
    );
}

#[test]
fn empty_object_decodes_and_fails_every_content_check() {
    let license = storage::decode_license(b"{}").unwrap();
    let result = validator().validate(&license);
    assert_eq!(
        result.errors,
        vec![
            SIGNATURE_VERIFICATION_FAILED.to_string(),
            CUSTOMER_REQUIRED.to_string(),
            APP_ID_REQUIRED.to_string(),
            SERVICE_REQUIRED.to_string(),
        ]
    );
}

#[cfg(unix)]
#[test]
fn files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let license_path = dir.path().join("license.json");
    let private_path = dir.path().join("private.pem");
    let public_path = dir.path().join("public.pem");

    let manager = generator();
    let signed = manager.generate(&minimal_license()).unwrap();
    manager.save_license(&signed, &license_path).unwrap();
    manager.save_keys(&private_path, &public_path).unwrap();

    for path in [&license_path, &private_path, &public_path] {
        let mode = std::fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "{}", path.display());
    }
}

#[cfg(unix)]
#[test]
fn overwrite_tightens_existing_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("license.json");
    std::fs::write(&path, "old").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    storage::write_private_file(&path, b"new").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(std::fs::read(&path).unwrap(), b"new");
}

#[test]
fn saved_keys_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let private_path = dir.path().join("private.pem");
    let public_path = dir.path().join("public.pem");
    let manager = generator();
    manager.save_keys(&private_path, &public_path).unwrap();

    let reloaded = Manager::new(
        ManagerConfig::generator()
            .with_private_key_path(&private_path)
            .with_public_key_path(&public_path),
    )
    .unwrap();
    assert_eq!(reloaded.key_id(), manager.key_id());

    let signed = reloaded.generate(&minimal_license()).unwrap();
    assert!(manager.validate(&signed).valid);

    let validator =
        Manager::new(ManagerConfig::validator().with_public_key_path(&public_path)).unwrap();
    assert!(validator.validate(&signed).valid);
}

#[test]
fn missing_key_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ManagerConfig::generator().with_private_key_path(dir.path().join("missing.pem"));
    assert!(matches!(Manager::new(config), Err(LicenseError::Io { .. })));
}

#[test]
fn save_public_key_in_validator_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("public.pem");
    let manager = validator();
    manager.save_public_key(&path).unwrap();
    assert!(matches!(
        manager.save_keys(dir.path().join("private.pem"), &path),
        Err(LicenseError::GeneratorModeRequired)
    ));
    assert!(!dir.path().join("private.pem").exists());
}
