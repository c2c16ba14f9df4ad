// src/application/dto/token.rs
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::GrantType;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

pub const BEARER: &str = "Bearer";

/// Client identity presented on the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }

    /// Parse an `Authorization: Basic ...` header value.
    pub fn from_basic_authorization(header: &str) -> ApplicationResult<Self> {
        let encoded = header
            .strip_prefix("Basic ")
            .ok_or_else(|| ApplicationError::invalid_credentials("expected basic authorization"))?;
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| ApplicationError::invalid_credentials("malformed basic authorization"))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| ApplicationError::invalid_credentials("malformed basic authorization"))?;
        let (id, secret) = decoded
            .split_once(':')
            .ok_or_else(|| ApplicationError::invalid_credentials("malformed basic authorization"))?;
        let secret = (!secret.is_empty()).then(|| secret.to_owned());
        Ok(Self::new(id, secret))
    }
}

/// Token endpoint request body, tagged by `grant_type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum TokenRequest {
    ClientCredentials {
        scope: Option<String>,
    },
    Password {
        username: String,
        password: String,
        scope: Option<String>,
    },
    AuthorizationCode {
        code: String,
        redirect_uri: Option<String>,
    },
    RefreshToken {
        refresh_token: String,
        scope: Option<String>,
    },
}

impl TokenRequest {
    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn from_form(body: &str) -> ApplicationResult<Self> {
        serde_urlencoded::from_str(body)
            .map_err(|err| ApplicationError::validation(format!("invalid token request: {err}")))
    }

    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::ClientCredentials { .. } => GrantType::ClientCredentials,
            Self::Password { .. } => GrantType::Password,
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Result of the implicit grant, delivered in the redirect URI fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImplicitGrant {
    #[serde(skip)]
    pub redirect_uri: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ImplicitGrant {
    pub fn fragment(&self) -> ApplicationResult<String> {
        serde_urlencoded::to_string(self)
            .map_err(|err| ApplicationError::validation(format!("unencodable fragment: {err}")))
    }

    pub fn redirect_location(&self) -> ApplicationResult<String> {
        Ok(format!("{}#{}", self.redirect_uri, self.fragment()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_password_form_and_ignores_client_fields() {
        let request = TokenRequest::from_form(
            "grant_type=password&username=alice&password=p%40ss&scope=read+write&client_id=c1",
        )
        .unwrap();
        assert_eq!(
            request,
            TokenRequest::Password {
                username: "alice".into(),
                password: "p@ss".into(),
                scope: Some("read write".into()),
            }
        );
        assert_eq!(request.grant_type(), GrantType::Password);
    }

    #[test]
    fn optional_fields_default_to_none() {
        let request = TokenRequest::from_form("grant_type=client_credentials").unwrap();
        assert_eq!(request, TokenRequest::ClientCredentials { scope: None });
    }

    #[test]
    fn unknown_grant_type_is_a_validation_error() {
        let err = TokenRequest::from_form("grant_type=device_code&device_code=x").unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[test]
    fn basic_authorization_splits_on_first_colon() {
        let header = format!("Basic {}", STANDARD.encode("c1:s1:extra"));
        let creds = ClientCredentials::from_basic_authorization(&header).unwrap();
        assert_eq!(creds.client_id, "c1");
        assert_eq!(creds.client_secret.as_deref(), Some("s1:extra"));
    }

    #[test]
    fn implicit_fragment_encodes_state_and_omits_redirect() {
        let grant = ImplicitGrant {
            redirect_uri: "https://app.example/cb".into(),
            access_token: "abc".into(),
            token_type: BEARER.into(),
            expires_in: 3600,
            scope: "read write".into(),
            state: Some("x y".into()),
        };
        assert_eq!(
            grant.fragment().unwrap(),
            "access_token=abc&token_type=Bearer&expires_in=3600&scope=read+write&state=x+y"
        );
        assert!(
            grant
                .redirect_location()
                .unwrap()
                .starts_with("https://app.example/cb#access_token=abc")
        );
    }
}
