// tests/support/builders.rs
use super::mocks::{
    MutableClock, PlainPasswordHasher, RecordingMetrics, SequentialTokenGenerator, plain_hash,
};
use oauth_authority::application::{
    authority::{AuthorityConfig, TokenAuthority},
    dto::{ClientCredentials, TokenRequest, TokenResponse},
    ports::storage::Storage,
};
use oauth_authority::domain::{
    Client, ClientId, PasswordHash, RedirectUri, Scope, User, UserId, Username,
};
use oauth_authority::infrastructure::storage::MemoryStorage;
use std::sync::Arc;

pub const CONFIDENTIAL_ID: &str = "confidential-app";
pub const CONFIDENTIAL_SECRET: &str = "s3cret";
pub const APP_REDIRECT: &str = "https://app.example/callback";
pub const PUBLIC_ID: &str = "public-app";
pub const SPA_REDIRECT: &str = "https://spa.example/callback";
pub const ALICE_ID: &str = "u-alice";
pub const ALICE: &str = "alice";
pub const ALICE_PASSWORD: &str = "wonderland";

pub fn client_id(id: &str) -> ClientId {
    ClientId::new(id).unwrap()
}

pub fn alice_id() -> UserId {
    UserId::new(ALICE_ID).unwrap()
}

pub fn confidential() -> ClientCredentials {
    ClientCredentials::new(CONFIDENTIAL_ID, Some(CONFIDENTIAL_SECRET.to_owned()))
}

pub fn public() -> ClientCredentials {
    ClientCredentials::new(PUBLIC_ID, None)
}

pub fn password_request(scope: Option<&str>) -> TokenRequest {
    TokenRequest::Password {
        username: ALICE.into(),
        password: ALICE_PASSWORD.into(),
        scope: scope.map(str::to_owned),
    }
}

pub fn user(id: &str, username: &str, password: &str) -> User {
    User::new(
        UserId::new(id).unwrap(),
        Username::new(username).unwrap(),
        PasswordHash::new(plain_hash(password)).unwrap(),
        super::fixed_now(),
    )
}

/// Two clients, one user and three scopes (`read` is the only default).
pub async fn seed(storage: &dyn Storage) {
    storage
        .create_client(Client::confidential(
            client_id(CONFIDENTIAL_ID),
            PasswordHash::new(plain_hash(CONFIDENTIAL_SECRET)).unwrap(),
            vec![RedirectUri::new(APP_REDIRECT).unwrap()],
            super::fixed_now(),
        ))
        .await
        .unwrap();
    storage
        .create_client(Client::public(
            client_id(PUBLIC_ID),
            vec![RedirectUri::new(SPA_REDIRECT).unwrap()],
            super::fixed_now(),
        ))
        .await
        .unwrap();
    storage
        .create_user(user(ALICE_ID, ALICE, ALICE_PASSWORD))
        .await
        .unwrap();
    for (name, is_default) in [("read", true), ("write", false), ("admin", false)] {
        storage
            .create_scope(Scope::new(name, is_default).unwrap())
            .await
            .unwrap();
    }
}

/// A seeded authority over in-memory storage with a controllable clock.
pub struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<MutableClock>,
    pub tokens: Arc<SequentialTokenGenerator>,
    pub metrics: Arc<RecordingMetrics>,
    pub authority: TokenAuthority,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(AuthorityConfig::default()).await
    }

    pub async fn with_config(config: AuthorityConfig) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new(Arc::new(PlainPasswordHasher)));
        Self::over(storage, Arc::new(MutableClock::default()), config).await
    }

    /// Seed `storage` and build an authority on top of it.
    pub async fn over(
        storage: Arc<dyn Storage>,
        clock: Arc<MutableClock>,
        config: AuthorityConfig,
    ) -> Self {
        seed(storage.as_ref()).await;
        Self::over_seeded(storage, clock, config)
    }

    /// Build an authority on top of storage that [`seed`] already populated.
    pub fn over_seeded(
        storage: Arc<dyn Storage>,
        clock: Arc<MutableClock>,
        config: AuthorityConfig,
    ) -> Self {
        let tokens = Arc::new(SequentialTokenGenerator::default());
        let metrics = Arc::new(RecordingMetrics::default());
        let authority = TokenAuthority::new(
            storage.clone(),
            Arc::new(PlainPasswordHasher),
            tokens.clone(),
            clock.clone(),
            config,
        )
        .with_metrics(metrics.clone());
        Self {
            storage,
            clock,
            tokens,
            metrics,
            authority,
        }
    }

    /// Another authority sharing this fixture's ports.
    pub fn authority_with(&self, config: AuthorityConfig) -> TokenAuthority {
        TokenAuthority::new(
            self.storage.clone(),
            Arc::new(PlainPasswordHasher),
            self.tokens.clone(),
            self.clock.clone(),
            config,
        )
        .with_metrics(self.metrics.clone())
    }

    /// Password grant for alice through the confidential client.
    pub async fn login(&self, scope: Option<&str>) -> TokenResponse {
        self.authority
            .token(&confidential(), password_request(scope))
            .await
            .unwrap()
    }
}
