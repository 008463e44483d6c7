use std::{collections::HashSet, sync::Arc, time::Duration};

use chirpy_backend_lib::auth::{
    AuthError, InMemoryRefreshTokens, RefreshTokenBackend, RefreshTokenStore, TokenState,
};
use chrono::Utc;
use uuid::Uuid;

fn store() -> (RefreshTokenStore, Arc<InMemoryRefreshTokens>) {
    let backend = Arc::new(InMemoryRefreshTokens::new());
    (RefreshTokenStore::new(backend.clone()), backend)
}

#[tokio::test]
async fn test_resolve_after_revoke() {
    let (store, _) = store();
    let subject = Uuid::new_v4();
    let issued = store.issue(subject).await.unwrap();

    assert_eq!(store.resolve(&issued.token).await, Ok(subject));
    store.revoke(&issued.token).await.unwrap();
    assert_eq!(
        store.resolve(&issued.token).await,
        Err(AuthError::RefreshTokenRevoked)
    );
}

#[tokio::test]
async fn test_revoke_twice_succeeds() {
    let (store, _) = store();
    let issued = store.issue(Uuid::new_v4()).await.unwrap();

    assert_eq!(store.revoke(&issued.token).await, Ok(()));
    assert_eq!(store.revoke(&issued.token).await, Ok(()));
}

#[tokio::test]
async fn test_one_user_many_sessions() {
    let (store, _) = store();
    let subject = Uuid::new_v4();
    let laptop = store.issue(subject).await.unwrap();
    let phone = store.issue(subject).await.unwrap();

    store.revoke(&laptop.token).await.unwrap();

    assert_eq!(
        store.resolve(&laptop.token).await,
        Err(AuthError::RefreshTokenRevoked)
    );
    assert_eq!(store.resolve(&phone.token).await, Ok(subject));
}

#[tokio::test]
async fn test_state_is_derived_from_time() {
    let (store, backend) = store();
    let now = Utc::now();
    let issued = store
        .issue_at(Uuid::new_v4(), Duration::from_secs(10), now)
        .await
        .unwrap();
    let record = backend.get(&issued.token).await.unwrap().unwrap();

    assert_eq!(record.state_at(now), TokenState::Active);
    assert_eq!(
        record.state_at(now + chrono::Duration::seconds(11)),
        TokenState::Expired
    );
    assert!(record.revoked_at.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_yields_unique_tokens() {
    let (store, backend) = store();
    let subject = Uuid::new_v4();

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.issue(subject).await.unwrap().token })
        })
        .collect();

    let mut tokens = HashSet::new();
    for handle in handles {
        assert!(tokens.insert(handle.await.unwrap()));
    }
    assert_eq!(backend.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resolve_racing_revoke_sees_whole_states() {
    let (store, _) = store();
    let subject = Uuid::new_v4();
    let issued = store.issue(subject).await.unwrap();

    let readers: Vec<_> = (0..32)
        .map(|_| {
            let store = store.clone();
            let token = issued.token.clone();
            tokio::spawn(async move { store.resolve(&token).await })
        })
        .collect();
    let revoker = {
        let store = store.clone();
        let token = issued.token.clone();
        tokio::spawn(async move { store.revoke(&token).await })
    };

    for reader in readers {
        match reader.await.unwrap() {
            Ok(resolved) => assert_eq!(resolved, subject),
            Err(e) => assert_eq!(e, AuthError::RefreshTokenRevoked),
        }
    }
    revoker.await.unwrap().unwrap();

    assert_eq!(
        store.resolve(&issued.token).await,
        Err(AuthError::RefreshTokenRevoked)
    );
}
