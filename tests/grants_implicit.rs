mod support;

use oauth_authority::application::error::ApplicationError;
use oauth_authority::domain::{GrantType, UserId};
use support::*;

#[tokio::test]
async fn issues_access_token_into_the_redirect_fragment() {
    let fx = Fixture::new().await;

    let grant = fx
        .authority
        .grant_implicit(&client_id(PUBLIC_ID), &alice_id(), None, None, Some("xyz"))
        .await
        .unwrap();

    assert_eq!(grant.redirect_uri, SPA_REDIRECT);
    assert_eq!(grant.token_type, "Bearer");
    assert_eq!(grant.expires_in, 3600);
    assert_eq!(grant.scope, "read");
    assert_eq!(grant.state.as_deref(), Some("xyz"));

    let location = grant.redirect_location().unwrap();
    assert!(
        location.starts_with(&format!("{SPA_REDIRECT}#access_token={}", grant.access_token)),
        "{location}"
    );
    assert!(location.ends_with("&state=xyz"), "{location}");
    assert!(!location.contains("refresh_token"));

    let stored = fx
        .storage
        .get_access_token(&grant.access_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user_id, Some(alice_id()));
    // Only the access token was minted.
    assert_eq!(fx.tokens.issued(), vec![grant.access_token.clone()]);
    assert_eq!(
        fx.metrics.issued(),
        vec![(PUBLIC_ID.to_owned(), GrantType::Implicit)]
    );
}

#[tokio::test]
async fn redirect_must_be_registered() {
    let fx = Fixture::new().await;

    let err = fx
        .authority
        .grant_implicit(
            &client_id(PUBLIC_ID),
            &alice_id(),
            Some(APP_REDIRECT),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::RedirectMismatch(_)));
}

#[tokio::test]
async fn unknown_client_or_user_is_not_found() {
    let fx = Fixture::new().await;

    let err = fx
        .authority
        .grant_implicit(&client_id("nobody"), &alice_id(), None, None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = fx
        .authority
        .grant_implicit(
            &client_id(PUBLIC_ID),
            &UserId::new("ghost").unwrap(),
            None,
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn requested_scope_is_validated() {
    let fx = Fixture::new().await;

    let grant = fx
        .authority
        .grant_implicit(&client_id(PUBLIC_ID), &alice_id(), None, Some("write"), None)
        .await
        .unwrap();
    assert_eq!(grant.scope, "write");

    let err = fx
        .authority
        .grant_implicit(&client_id(PUBLIC_ID), &alice_id(), None, Some("root"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::InvalidScope(_)));
}
