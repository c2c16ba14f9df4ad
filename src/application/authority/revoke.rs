// src/application/authority/revoke.rs
use super::TokenAuthority;
use crate::application::{dto::TokenTypeHint, error::ApplicationResult};

impl TokenAuthority {
    /// RFC 7009 revocation. Returns whether anything was removed; unknown
    /// tokens are not an error.
    pub async fn revoke(&self, token: &str, hint: Option<&str>) -> ApplicationResult<bool> {
        let first = TokenTypeHint::parse_lenient(hint).unwrap_or(TokenTypeHint::AccessToken);
        self.within_deadline("revoke", async {
            for kind in [first, first.other()] {
                let removed = match kind {
                    TokenTypeHint::AccessToken => self.storage.delete_access_token(token).await?,
                    TokenTypeHint::RefreshToken => self.storage.delete_refresh_token(token).await?,
                };
                if removed {
                    tracing::debug!(token_type = kind.as_str(), "token revoked");
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .await
    }

    /// Bulk revocation of access tokens; returns how many were removed.
    pub async fn revoke_access_tokens(&self, tokens: &[String]) -> ApplicationResult<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }
        self.within_deadline(
            "revoke_access_tokens",
            self.storage.batch_delete_access_tokens(tokens),
        )
        .await
    }
}
