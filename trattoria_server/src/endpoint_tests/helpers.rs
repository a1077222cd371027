use actix_web::{
    body,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use log::debug;

use crate::{
    auth::{Role, TokenIssuer},
    config::AuthConfig,
    middleware::BearerAuthMiddlewareFactory,
    server::{json_config, query_config},
};

// A fixed secret for issuing test tokens. DO NOT re-use it anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-tests-only-secret-9b1f0c2e7d4a5b6c")
}

pub fn issue_token(email: &str, roles: &[Role]) -> String {
    TokenIssuer::new(&get_auth_config()).issue_token(email, roles, None).expect("Failed to sign token")
}

pub fn with_token(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {token}")))
}

/// Runs `req` against an app with the bearer token middleware and the given routes.
///
/// Errors raised by middleware and errors returned by handlers are both turned into their HTTP responses, so the
/// caller always sees the status and body a client would.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let issuer = TokenIssuer::new(&get_auth_config());
    let app = App::new()
        .wrap(BearerAuthMiddlewareFactory::new(issuer))
        .app_data(json_config())
        .app_data(query_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let bytes = test::read_body(res).await;
            (status, String::from_utf8_lossy(&bytes).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let bytes = body::to_bytes(res.into_body()).await.expect("Could not read error body");
            (status, String::from_utf8_lossy(&bytes).into_owned())
        },
    }
}
