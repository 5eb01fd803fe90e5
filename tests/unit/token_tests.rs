use accountd_backend::auth::{TokenIssuer, TOKEN_TTL};
use accountd_backend::error::AppError;
use std::time::Duration;
use uuid::Uuid;

#[test]
fn test_token_lifetime_is_thirty_days() {
    assert_eq!(TOKEN_TTL, Duration::from_secs(30 * 24 * 60 * 60));

    let issuer = TokenIssuer::new(Some("secret"));
    let claims = issuer.verify(&issuer.issue(Uuid::new_v4()).unwrap()).unwrap();
    assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
}

#[test]
fn test_each_token_carries_its_own_account() {
    let issuer = TokenIssuer::new(Some("secret"));
    let (first_id, second_id) = (Uuid::new_v4(), Uuid::new_v4());
    let first = issuer.issue(first_id).unwrap();
    let second = issuer.issue(second_id).unwrap();
    assert_ne!(first, second);
    assert_eq!(issuer.verify(&first).unwrap().id, first_id);
    assert_eq!(issuer.verify(&second).unwrap().id, second_id);
}

#[test]
fn test_tampered_token_rejected() {
    let issuer = TokenIssuer::new(Some("secret"));
    let mut token = issuer.issue(Uuid::new_v4()).unwrap();
    token.push('x');
    assert!(matches!(issuer.verify(&token), Err(AppError::Unauthorized(_))));
}
