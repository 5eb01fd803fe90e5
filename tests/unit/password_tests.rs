use accountd_backend::auth::{hash_password, verify_password};
use accountd_backend::config::PasswordHashSettings;

#[test]
fn test_password_hashing_and_verification() {
    let params = PasswordHashSettings::insecure_fast().params().unwrap();
    let password = "SecureP@ssw0rd";
    let hash = hash_password(password, params).unwrap();

    // Hash should be different than the original password
    assert_ne!(password, hash);
    assert!(verify_password(&hash, password));
    assert!(!verify_password(&hash, "securep@ssw0rd"));
}

#[test]
fn test_hash_carries_its_own_parameters() {
    // A hash made with one cost still verifies after the configured cost changes
    let cheap = PasswordHashSettings::insecure_fast().params().unwrap();
    let hash = hash_password("secret123", cheap).unwrap();
    assert!(hash.contains("ln=4"));
    assert!(verify_password(&hash, "secret123"));
}

#[test]
fn test_invalid_cost_rejected() {
    let settings = PasswordHashSettings { log_n: 15, r: 0, p: 1 };
    assert!(settings.params().is_err());
}
