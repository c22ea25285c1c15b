//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use derive_more::Debug;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use service::domain::user;

use crate::{define_error, Error, Service};

/// Verifier of [JWT] bearer tokens.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Debug)]
pub struct Authenticator {
    /// Key verifying token signatures.
    #[debug(skip)]
    key: DecodingKey,

    /// Rules of token validation.
    validation: Validation,
}

impl Authenticator {
    /// Creates a new [`Authenticator`] verifying `HS256` tokens signed with
    /// the provided `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is validated only when present.
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verifies the provided `token` and returns the [`Session`] it grants.
    ///
    /// # Errors
    ///
    /// If the `token` is malformed, forged, expired or carries invalid claims.
    pub fn authenticate(&self, token: &str) -> Result<Session, Error> {
        /// Claims of a token.
        #[derive(Deserialize)]
        struct Claims {
            user_id: String,
            #[serde(default)]
            role: Option<String>,
        }

        let Claims { user_id, role } =
            jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
                .map_err(|_| AuthError::InvalidToken)?
                .claims;
        Ok(Session {
            user_id: user::Id::new(user_id).ok_or(AuthError::InvalidToken)?,
            role: role
                .map(|r| user::Role::new(r).ok_or(AuthError::InvalidToken))
                .transpose()?,
        })
    }
}

/// Request context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Authenticator`] of the request.
    authenticator: Authenticator,

    /// Parts of the HTTP request.
    parts: http::request::Parts,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the current [`Session`] for this [`Context`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided authentication token is invalid.
    pub async fn current_session(&self) -> Result<Session, Error> {
        let TypedHeader(Authorization(bearer)) = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    AuthError::AuthorizationRequired
                } else {
                    AuthError::InvalidToken
                }
            })?;
        self.authenticator.authenticate(bearer.token())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| Error::internal(&"missing `Service` extension"))?;
        let authenticator = parts
            .extensions
            .get::<Authenticator>()
            .cloned()
            .ok_or_else(|| {
                Error::internal(&"missing `Authenticator` extension")
            })?;

        Ok(Self {
            service,
            authenticator,
            parts: parts.clone(),
        })
    }
}

/// Authenticated user session.
#[derive(Clone, Debug)]
pub struct Session {
    /// ID of the authenticated user.
    pub user_id: user::Id,

    /// [`user::Role`] of the authenticated user, if any.
    pub role: Option<user::Role>,
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid authorization token"]
        InvalidToken,
    }
}
