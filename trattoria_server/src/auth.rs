//! Access tokens.
//!
//! The server does not log anyone in. It only verifies bearer tokens that were issued elsewhere with the shared
//! `TOG_AUTH_SECRET`. Tokens are HS256 JWTs carrying [`AccessClaims`] and a mandatory `exp` claim.
use std::{
    future::{ready, Ready},
    time::Duration,
};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    prelude::*,
    ValidationError,
};
use log::*;
use serde::{Deserialize, Serialize};
use trattoria_engine::order_access::Caller;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Staff,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl AccessClaims {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn caller(&self) -> Caller {
        if self.has_role(Role::Staff) {
            Caller::staff(self.email.clone())
        } else {
            Caller::customer(self.email.clone())
        }
    }
}

/// Requests without a bearer token act on behalf of an anonymous caller.
pub fn caller_from(claims: Option<AccessClaims>) -> Caller {
    claims.map(|c| c.caller()).unwrap_or(Caller::Anonymous)
}

/// Claims are placed in the request extensions by [`crate::middleware::BearerAuthMiddlewareFactory`]. Extracting
/// them fails for anonymous requests, so use `Option<AccessClaims>` on routes that anyone may call.
impl FromRequest for AccessClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AccessClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    key: Hs256Key,
    time_options: TimeOptions,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = Hs256Key::new(config.token_secret.reveal().as_bytes());
        Self { key, time_options: TimeOptions::default() }
    }

    /// Signs an access token for `email`. Tokens are valid for 24 hours unless a lifetime is given.
    pub fn issue_token(&self, email: &str, roles: &[Role], lifetime: Option<Duration>) -> Result<String, ServerError> {
        let lifetime = lifetime.unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| ServerError::Unspecified(format!("Invalid token lifetime. {e}")))?;
        let claims = AccessClaims { email: email.to_string(), roles: roles.to_vec() };
        let claims = Claims::new(claims).set_duration_and_issuance(&self.time_options, lifetime);
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims<AccessClaims>) -> Result<String, ServerError> {
        let header = Header::empty().with_token_type("JWT");
        Hs256
            .token(&header, claims, &self.key)
            .map_err(|e| ServerError::Unspecified(format!("Could not sign token. {e}")))
    }

    /// Checks the signature and expiry of `token` and returns its claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token: Token<AccessClaims> = Hs256.validator(&self.key).validate(&untrusted).map_err(|e| match e {
            ValidationError::InvalidSignature => {
                debug!("🔐️ Access token signature verification failed");
                AuthError::InvalidSignature
            },
            e => AuthError::PoorlyFormattedToken(e.to_string()),
        })?;
        let claims = token.claims();
        claims.validate_expiration(&self.time_options).map_err(|e| match e {
            ValidationError::Expired => {
                debug!("🔐️ Access token for {} has expired", claims.custom.email);
                AuthError::Expired
            },
            e => AuthError::PoorlyFormattedToken(e.to_string()),
        })?;
        trace!("🔐️ Access token for {} verified", claims.custom.email);
        Ok(claims.custom.clone())
    }
}
