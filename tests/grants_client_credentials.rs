use std::{num::NonZeroU32, sync::Arc, time::Duration};

mod support;

use oauth_authority::application::{
    authority::AuthorityConfig,
    dto::{ClientCredentials, TokenRequest},
    error::ApplicationError,
    ports::storage::Storage,
};
use oauth_authority::domain::GrantType;
use oauth_authority::infrastructure::{rate_limit::GovernorRateLimiter, storage::MemoryStorage};
use support::*;

fn client_credentials(scope: Option<&str>) -> TokenRequest {
    TokenRequest::ClientCredentials {
        scope: scope.map(str::to_owned),
    }
}

#[tokio::test]
async fn issues_access_token_with_default_scope() {
    let fx = Fixture::new().await;

    let response = fx
        .authority
        .token(&confidential(), client_credentials(None))
        .await
        .unwrap();

    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.scope, "read");
    assert_eq!(response.expires_in, 3600);
    assert!(response.refresh_token.is_none());
    assert!(response.user_id.is_none());

    let stored = fx
        .storage
        .get_access_token(&response.access_token)
        .await
        .unwrap()
        .expect("access token persisted");
    assert_eq!(stored.client_id.as_str(), CONFIDENTIAL_ID);
    assert!(stored.user_id.is_none());
    assert_eq!(stored.expires_at, fixed_now() + chrono::Duration::hours(1));
}

#[tokio::test]
async fn explicit_scope_must_exist() {
    let fx = Fixture::new().await;

    let response = fx
        .authority
        .token(&confidential(), client_credentials(Some("read write")))
        .await
        .unwrap();
    assert_eq!(response.scope, "read write");

    let err = fx
        .authority
        .token(&confidential(), client_credentials(Some("read delete")))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidScope(_)), "{err:?}");
    assert_eq!(err.oauth_error_code(), "invalid_scope");
}

#[tokio::test]
async fn wrong_or_missing_secret_is_rejected() {
    let fx = Fixture::new().await;

    let wrong = ClientCredentials::new(CONFIDENTIAL_ID, Some("guess".into()));
    let err = fx
        .authority
        .token(&wrong, client_credentials(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidCredentials(_)));
    assert_eq!(err.oauth_error_code(), "invalid_client");

    let missing = ClientCredentials::new(CONFIDENTIAL_ID, None);
    let err = fx
        .authority
        .token(&missing, client_credentials(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidCredentials(_)));
}

#[tokio::test]
async fn public_clients_cannot_use_client_credentials() {
    let fx = Fixture::new().await;

    let err = fx
        .authority
        .token(&public(), client_credentials(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidCredentials(_)));
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let fx = Fixture::new().await;

    let err = fx
        .authority
        .token(
            &ClientCredentials::new("nobody", Some("x".into())),
            client_credentials(None),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err:?}");
}

#[tokio::test]
async fn refresh_token_is_opt_in() {
    let fx = Fixture::with_config(AuthorityConfig {
        client_credentials_refresh_token: true,
        ..AuthorityConfig::default()
    })
    .await;

    let response = fx
        .authority
        .token(&confidential(), client_credentials(None))
        .await
        .unwrap();

    let refresh = response.refresh_token.expect("refresh token issued");
    let stored = fx.storage.get_refresh_token(&refresh).await.unwrap().unwrap();
    assert!(stored.user_id.is_none());
    assert_eq!(stored.scope, "read");
}

#[tokio::test]
async fn issuance_is_recorded_in_metrics() {
    let fx = Fixture::new().await;

    fx.authority
        .token(&confidential(), client_credentials(None))
        .await
        .unwrap();

    assert_eq!(
        fx.metrics.issued(),
        vec![(CONFIDENTIAL_ID.to_owned(), GrantType::ClientCredentials)]
    );
}

#[tokio::test]
async fn rate_limit_applies_per_client() {
    let fx = Fixture::new().await;
    let authority = fx
        .authority_with(AuthorityConfig::default())
        .with_rate_limiter(Arc::new(GovernorRateLimiter::per_second(
            NonZeroU32::new(1).unwrap(),
        )));

    authority
        .token(&confidential(), client_credentials(None))
        .await
        .unwrap();
    let err = authority
        .token(&confidential(), client_credentials(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::RateLimited(_)));
    assert_eq!(err.oauth_error_code(), "slow_down");

    // The public client has its own bucket.
    let result = authority.token(&public(), password_request(None)).await;
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn failed_client_authentication_does_not_spend_the_quota() {
    let fx = Fixture::new().await;
    let authority = fx
        .authority_with(AuthorityConfig::default())
        .with_rate_limiter(Arc::new(GovernorRateLimiter::per_second(
            NonZeroU32::new(1).unwrap(),
        )));
    let forged = ClientCredentials::new(CONFIDENTIAL_ID, Some("guessed".to_owned()));

    for _ in 0..3 {
        let err = authority
            .token(&forged, client_credentials(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidCredentials(_)), "{err:?}");
    }
    let result = authority.token(&confidential(), client_credentials(None)).await;
    assert!(result.is_ok(), "{result:?}");
}

#[tokio::test]
async fn slow_backend_hits_the_deadline() {
    let controlled = Arc::new(ControlledStorage::new(Arc::new(MemoryStorage::new(
        Arc::new(PlainPasswordHasher),
    ))));
    let storage: Arc<dyn Storage> = controlled.clone();
    let fx = Fixture::over(
        storage,
        Arc::new(MutableClock::default()),
        AuthorityConfig {
            backend_timeout: Duration::from_millis(50),
            ..AuthorityConfig::default()
        },
    )
    .await;
    controlled.delay_client_lookups(Duration::from_millis(500));

    let err = fx
        .authority
        .token(&confidential(), client_credentials(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::BackendUnavailable(_)), "{err:?}");
    assert_eq!(err.oauth_error_code(), "temporarily_unavailable");
}
