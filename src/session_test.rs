use super::*;

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(token, generate_token());
}

#[test]
fn token_debug_is_redacted() {
    let token = Token::new("secret-value");
    assert_eq!(format!("{token:?}"), "Token(***)");
}

#[tokio::test]
async fn signed_out_has_no_user_or_token() {
    let provider = LocalSessionProvider::new();
    assert!(provider.current_user().is_none());
    assert!(!provider.is_authenticated());
    assert!(matches!(provider.id_token().await, Err(SessionError::Unauthenticated)));
}

#[tokio::test]
async fn federated_sign_in_exposes_token() {
    let provider = LocalSessionProvider::new();
    let user = provider
        .sign_in_federated("artisan-1", Some("Ravi"), "id-token-abc")
        .unwrap();
    assert_eq!(user.method, SignInMethod::Federated);
    assert_eq!(provider.current_user().unwrap().uid, "artisan-1");
    assert_eq!(provider.id_token().await.unwrap().as_str(), "id-token-abc");
}

#[test]
fn federated_sign_in_rejects_empty_token() {
    let provider = LocalSessionProvider::new();
    let err = provider.sign_in_federated("artisan-1", None, " ").unwrap_err();
    assert!(matches!(err, SessionError::SignInRejected(_)));
    assert!(!provider.is_authenticated());
}

#[tokio::test]
async fn anonymous_sign_in_generates_guest_identity() {
    let provider = LocalSessionProvider::new();
    let user = provider.sign_in_anonymously();
    assert!(user.uid.starts_with("guest-"));
    assert_eq!(user.method, SignInMethod::Anonymous);
    assert_eq!(provider.id_token().await.unwrap().as_str().len(), 64);
}

#[test]
fn epoch_changes_on_sign_in_and_out() {
    let provider = LocalSessionProvider::new();
    let e0 = provider.epoch();
    provider.sign_in_anonymously();
    let e1 = provider.epoch();
    provider.sign_out();
    let e2 = provider.epoch();
    assert!(e0 < e1 && e1 < e2);
    assert!(provider.current_user().is_none());
}
