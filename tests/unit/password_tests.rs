use start_backend_lib::auth::{
    hash_password, validate_password, verify_password, PasswordEncoder, PasswordPolicy,
    PasswordValidationError,
};

#[test]
fn test_password_validation() {
    assert_eq!(validate_password(None), Err(PasswordValidationError::Empty));
    assert_eq!(validate_password(Some("")), Err(PasswordValidationError::Empty));
    assert_eq!(
        validate_password(Some("1234567")),
        Err(PasswordValidationError::TooShort { min_length: 8 })
    );
    assert!(validate_password(Some("12345678")).is_ok());
    // Whitespace and non-ASCII characters count
    assert!(validate_password(Some("        ")).is_ok());
    assert!(validate_password(Some("pässwörd")).is_ok());
}

#[test]
fn test_validation_messages() {
    assert_eq!(
        PasswordValidationError::Empty.to_string(),
        "Password cannot be empty"
    );
    assert_eq!(
        PasswordPolicy::new(12).validate(Some("short")).unwrap_err().to_string(),
        "Password must be at least 12 characters long"
    );
}

#[test]
fn test_password_hashing_and_verification() {
    let encoder = PasswordEncoder::with_log_n(4).unwrap();
    let hash = encoder.hash("SecureP@ssw0rd").unwrap();

    assert_ne!(hash, "SecureP@ssw0rd");
    assert!(hash.starts_with("$scrypt$"));
    assert!(encoder.verify(&hash, "SecureP@ssw0rd"));
    assert!(!encoder.verify(&hash, "WrongPassword"));
    assert!(!encoder.verify("not a hash", "SecureP@ssw0rd"));
}

#[test]
fn test_default_cost_helpers() {
    let hash = hash_password("correct horse battery").unwrap();
    assert!(verify_password(&hash, "correct horse battery"));
    assert!(!verify_password(&hash, "correct horse"));
}
