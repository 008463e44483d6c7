use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use chirpy_backend_lib::auth::{extract_bearer, AuthError, CredentialExtractor};

fn authorization(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

#[test]
fn test_extract_bearer_cases() {
    assert_eq!(
        extract_bearer(&authorization("Bearer   abc123  ")),
        Ok("abc123".to_string())
    );
    assert_eq!(
        extract_bearer(&authorization("Token abc123")),
        Err(AuthError::HeaderMalformed)
    );
    assert_eq!(extract_bearer(&HeaderMap::new()), Err(AuthError::HeaderMissing));
    assert_eq!(extract_bearer(&authorization("Bearer ")), Err(AuthError::TokenEmpty));
    assert_eq!(
        extract_bearer(&authorization("Bearer    ")),
        Err(AuthError::TokenEmpty)
    );
}

#[test]
fn test_prefix_needs_the_space() {
    assert_eq!(
        extract_bearer(&authorization("Bearerabc123")),
        Err(AuthError::HeaderMalformed)
    );
}

#[test]
fn test_api_key_default_convention() {
    let extractor = CredentialExtractor::default();

    assert_eq!(
        extractor.api_key(&authorization("ApiKey f271c81ff7084ee5")),
        Ok("f271c81ff7084ee5".to_string())
    );
    assert_eq!(
        extractor.api_key(&authorization("Bearer f271c81ff7084ee5")),
        Err(AuthError::HeaderMalformed)
    );
    assert_eq!(
        extractor.api_key(&authorization("ApiKey ")),
        Err(AuthError::TokenEmpty)
    );
    assert_eq!(extractor.api_key(&HeaderMap::new()), Err(AuthError::HeaderMissing));
}

#[test]
fn test_api_key_custom_header_ignores_authorization() {
    let extractor = CredentialExtractor::new(HeaderName::from_static("x-api-key"), "");
    let headers = authorization("ApiKey f271c81ff7084ee5");

    assert_eq!(extractor.api_key(&headers), Err(AuthError::HeaderMissing));

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_static(" f271c81ff7084ee5 "));
    assert_eq!(extractor.api_key(&headers), Ok("f271c81ff7084ee5".to_string()));
}
