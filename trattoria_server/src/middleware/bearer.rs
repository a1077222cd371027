//! Bearer token middleware.
//!
//! Wrap the whole application with this middleware. If a request carries an `Authorization: Bearer <token>` header,
//! the token is verified and its [`AccessClaims`] are stored in the request extensions for handlers and the ACL
//! middleware to pick up. Requests without the header pass through untouched and are treated as anonymous. A header
//! with an invalid or expired token is rejected with a 401.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::*;

use crate::{
    auth::{AccessClaims, TokenIssuer},
    errors::{AuthError, ServerError},
};

pub struct BearerAuthMiddlewareFactory {
    issuer: TokenIssuer,
}

impl BearerAuthMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        BearerAuthMiddlewareFactory { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = BearerAuthMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddlewareService { issuer: self.issuer.clone(), service: Rc::new(service) }))
    }
}

pub struct BearerAuthMiddlewareService<S> {
    issuer: TokenIssuer,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = match req.headers().get(AUTHORIZATION) {
            None => Ok(None),
            Some(value) => read_bearer_token(value.to_str().ok()).and_then(|token| self.issuer.verify(token)).map(Some),
        };
        Box::pin(async move {
            match claims {
                Ok(Some(claims)) => {
                    trace!("🔐️ Request to {} made by {}", req.path(), claims.email);
                    req.extensions_mut().insert::<AccessClaims>(claims);
                },
                Ok(None) => trace!("🔐️ Anonymous request to {}", req.path()),
                Err(e) => {
                    info!("🔐️ Rejected access token for {}. {e}", req.path());
                    return Err(ServerError::AuthenticationError(e).into());
                },
            }
            service.call(req).await
        })
    }
}

fn read_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected 'Authorization: Bearer <token>'".into()))
}
