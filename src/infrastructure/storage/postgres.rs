// src/infrastructure/storage/postgres.rs
use super::{credentials::UserCredentials, error::map_sqlx};
use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::{security::PasswordHasher, storage::Storage},
};
use crate::domain::{
    AccessToken, AuthorizationCode, Client, ClientId, ExpiringRecord, PasswordHash, RedirectUri,
    RefreshToken, Scope, User, UserId, Username, errors::DomainError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    credentials: Arc<UserCredentials>,
}

impl PostgresStorage {
    pub fn new(pool: PgPool, password_hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            pool,
            credentials: Arc::new(UserCredentials::new(password_hasher)),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_user(&self, column: &'static str, value: &str) -> ApplicationResult<Option<User>> {
        let sql = format!(
            "SELECT id, username, password_hash, created_at FROM oauth_users WHERE {column} = $1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn delete_token_row(&self, sql: &'static str, key: &str) -> ApplicationResult<bool> {
        let result = sqlx::query(sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: String,
    secret_hash: Option<String>,
    confidential: bool,
    redirect_uris: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = DomainError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(Client {
            id: ClientId::new(row.id)?,
            secret_hash: row.secret_hash.map(PasswordHash::new).transpose()?,
            confidential: row.confidential,
            redirect_uris: row
                .redirect_uris
                .into_iter()
                .map(RedirectUri::new)
                .collect::<Result<_, _>>()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(row.id)?,
            username: Username::new(row.username)?,
            password_hash: PasswordHash::new(row.password_hash)?,
            created_at: row.created_at,
        })
    }
}

/// Shared shape of the access and refresh token tables.
#[derive(Debug, FromRow)]
struct TokenRow {
    token: String,
    client_id: String,
    user_id: Option<String>,
    scope: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TokenRow> for AccessToken {
    type Error = DomainError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        Ok(AccessToken {
            token: row.token,
            client_id: ClientId::new(row.client_id)?,
            user_id: row.user_id.map(UserId::new).transpose()?,
            scope: row.scope,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<TokenRow> for RefreshToken {
    type Error = DomainError;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        Ok(RefreshToken {
            token: row.token,
            client_id: ClientId::new(row.client_id)?,
            user_id: row.user_id.map(UserId::new).transpose()?,
            scope: row.scope,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CodeRow {
    code: String,
    client_id: String,
    user_id: String,
    redirect_uri: Option<String>,
    scope: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CodeRow> for AuthorizationCode {
    type Error = DomainError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        Ok(AuthorizationCode {
            code: row.code,
            client_id: ClientId::new(row.client_id)?,
            user_id: UserId::new(row.user_id)?,
            redirect_uri: row.redirect_uri,
            scope: row.scope,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ScopeRow {
    name: String,
    is_default: bool,
}

const fn expiring_table(kind: ExpiringRecord) -> &'static str {
    match kind {
        ExpiringRecord::AccessToken => "oauth_access_tokens",
        ExpiringRecord::RefreshToken => "oauth_refresh_tokens",
        ExpiringRecord::AuthorizationCode => "oauth_authorization_codes",
    }
}

fn redirect_strings(client: &Client) -> Vec<String> {
    client
        .redirect_uris
        .iter()
        .map(|uri| uri.as_str().to_owned())
        .collect()
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn get_client(&self, id: &ClientId) -> ApplicationResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            "SELECT id, secret_hash, confidential, redirect_uris, created_at
             FROM oauth_clients WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(Client::try_from).transpose()?)
    }

    async fn create_client(&self, client: Client) -> ApplicationResult<()> {
        client.validate()?;
        sqlx::query(
            "INSERT INTO oauth_clients (id, secret_hash, confidential, redirect_uris, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(client.id.as_str())
        .bind(client.secret_hash.as_ref().map(PasswordHash::as_str))
        .bind(client.confidential)
        .bind(redirect_strings(&client))
        .bind(client.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update_client(&self, client: Client) -> ApplicationResult<()> {
        client.validate()?;
        let result = sqlx::query(
            "UPDATE oauth_clients
             SET secret_hash = $2, confidential = $3, redirect_uris = $4
             WHERE id = $1",
        )
        .bind(client.id.as_str())
        .bind(client.secret_hash.as_ref().map(PasswordHash::as_str))
        .bind(client.confidential)
        .bind(redirect_strings(&client))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(ApplicationError::not_found(format!("client {}", client.id)));
        }
        Ok(())
    }

    async fn delete_client(&self, id: &ClientId) -> ApplicationResult<()> {
        let result = sqlx::query("DELETE FROM oauth_clients WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(ApplicationError::not_found(format!("client {id}")));
        }
        Ok(())
    }

    async fn get_user(&self, username: &Username) -> ApplicationResult<Option<User>> {
        self.fetch_user("username", username.as_str()).await
    }

    async fn get_user_by_id(&self, id: &UserId) -> ApplicationResult<Option<User>> {
        self.fetch_user("id", id.as_str()).await
    }

    async fn create_user(&self, user: User) -> ApplicationResult<()> {
        sqlx::query(
            "INSERT INTO oauth_users (id, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id.as_str())
        .bind(user.username.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update_user(&self, user: User) -> ApplicationResult<()> {
        let result = sqlx::query(
            "UPDATE oauth_users SET username = $2, password_hash = $3 WHERE id = $1",
        )
        .bind(user.id.as_str())
        .bind(user.username.as_str())
        .bind(user.password_hash.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(ApplicationError::not_found(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> ApplicationResult<()> {
        let result = sqlx::query("DELETE FROM oauth_users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(ApplicationError::not_found(format!("user {id}")));
        }
        Ok(())
    }

    async fn authenticate_user(
        &self,
        username: &Username,
        password: &str,
    ) -> ApplicationResult<User> {
        let user = self.get_user(username).await?;
        self.credentials.check(user, password).await
    }

    async fn store_access_token(&self, token: AccessToken) -> ApplicationResult<()> {
        sqlx::query(
            "INSERT INTO oauth_access_tokens (token, client_id, user_id, scope, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&token.token)
        .bind(token.client_id.as_str())
        .bind(token.user_id.as_ref().map(UserId::as_str))
        .bind(&token.scope)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_access_token(&self, token: &str) -> ApplicationResult<Option<AccessToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT token, client_id, user_id, scope, expires_at, created_at
             FROM oauth_access_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(AccessToken::try_from).transpose()?)
    }

    async fn delete_access_token(&self, token: &str) -> ApplicationResult<bool> {
        self.delete_token_row("DELETE FROM oauth_access_tokens WHERE token = $1", token)
            .await
    }

    async fn batch_get_access_tokens(
        &self,
        tokens: &[String],
    ) -> ApplicationResult<Vec<AccessToken>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, TokenRow>(
            "SELECT token, client_id, user_id, scope, expires_at, created_at
             FROM oauth_access_tokens WHERE token = ANY($1)",
        )
        .bind(tokens)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows
            .into_iter()
            .map(AccessToken::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn batch_delete_access_tokens(&self, tokens: &[String]) -> ApplicationResult<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM oauth_access_tokens WHERE token = ANY($1)")
            .bind(tokens)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn store_refresh_token(&self, token: RefreshToken) -> ApplicationResult<()> {
        sqlx::query(
            "INSERT INTO oauth_refresh_tokens (token, client_id, user_id, scope, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&token.token)
        .bind(token.client_id.as_str())
        .bind(token.user_id.as_ref().map(UserId::as_str))
        .bind(&token.scope)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> ApplicationResult<Option<RefreshToken>> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT token, client_id, user_id, scope, expires_at, created_at
             FROM oauth_refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(RefreshToken::try_from).transpose()?)
    }

    async fn delete_refresh_token(&self, token: &str) -> ApplicationResult<bool> {
        self.delete_token_row("DELETE FROM oauth_refresh_tokens WHERE token = $1", token)
            .await
    }

    async fn extend_refresh_tokens(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        expires_at: DateTime<Utc>,
    ) -> ApplicationResult<u64> {
        // GREATEST keeps concurrent extensions from shrinking the window.
        let result = sqlx::query(
            "UPDATE oauth_refresh_tokens
             SET expires_at = GREATEST(expires_at, $3)
             WHERE client_id = $1 AND user_id IS NOT DISTINCT FROM $2 AND expires_at < $3",
        )
        .bind(client_id.as_str())
        .bind(user_id.map(UserId::as_str))
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn store_authorization_code(&self, code: AuthorizationCode) -> ApplicationResult<()> {
        sqlx::query(
            "INSERT INTO oauth_authorization_codes
                (code, client_id, user_id, redirect_uri, scope, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&code.code)
        .bind(code.client_id.as_str())
        .bind(code.user_id.as_str())
        .bind(code.redirect_uri.as_deref())
        .bind(&code.scope)
        .bind(code.expires_at)
        .bind(code.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_authorization_code(
        &self,
        code: &str,
    ) -> ApplicationResult<Option<AuthorizationCode>> {
        let row = sqlx::query_as::<_, CodeRow>(
            "SELECT code, client_id, user_id, redirect_uri, scope, expires_at, created_at
             FROM oauth_authorization_codes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(AuthorizationCode::try_from).transpose()?)
    }

    async fn delete_authorization_code(&self, code: &str) -> ApplicationResult<bool> {
        self.delete_token_row("DELETE FROM oauth_authorization_codes WHERE code = $1", code)
            .await
    }

    async fn create_scope(&self, scope: Scope) -> ApplicationResult<()> {
        sqlx::query("INSERT INTO oauth_scopes (name, is_default) VALUES ($1, $2)")
            .bind(&scope.name)
            .bind(scope.is_default)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn get_scope(&self, name: &str) -> ApplicationResult<Option<Scope>> {
        let row = sqlx::query_as::<_, ScopeRow>(
            "SELECT name, is_default FROM oauth_scopes WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(|row| Scope {
            name: row.name,
            is_default: row.is_default,
        }))
    }

    async fn get_default_scope(&self) -> ApplicationResult<String> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM oauth_scopes WHERE is_default ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(names.join(" "))
    }

    async fn delete_expired(
        &self,
        kind: ExpiringRecord,
        before: DateTime<Utc>,
        limit: u32,
    ) -> ApplicationResult<u64> {
        let table = expiring_table(kind);
        let sql = format!(
            "DELETE FROM {table} WHERE ctid IN (
                SELECT ctid FROM {table} WHERE expires_at < $1 LIMIT $2
             )"
        );
        let result = sqlx::query(&sql)
            .bind(before)
            .bind(i64::from(limit))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx)
    }

    async fn close(&self) -> ApplicationResult<()> {
        self.pool.close().await;
        Ok(())
    }
}
