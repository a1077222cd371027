use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use thiserror::Error;
use trattoria_engine::{traits::CatalogApiError, GatewayError, OrderFlowError};

const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    InsufficientPermissions(String),
    #[error(transparent)]
    PaymentGatewayError(#[from] GatewayError),
}

impl ServerError {
    /// Errors whose details are for the operator's eyes only.
    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentGatewayError(e) => match e {
                GatewayError::Business(_) => StatusCode::BAD_REQUEST,
                GatewayError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
                GatewayError::Unavailable(_) => StatusCode::BAD_GATEWAY,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            error!("💻️ {self}");
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authentication is required.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token signature is invalid.")]
    InvalidSignature,
    #[error("Access token has expired.")]
    Expired,
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidItems(_) => Self::ValidationError(e.to_string()),
            OrderFlowError::Validation(msg) => Self::ValidationError(msg),
            OrderFlowError::NotFound => Self::NoRecordFound(e.to_string()),
            OrderFlowError::Forbidden(msg) => Self::InsufficientPermissions(msg),
            OrderFlowError::Gateway(e) => Self::PaymentGatewayError(e),
            OrderFlowError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::MenuItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            CatalogApiError::Validation(_) | CatalogApiError::ModificationNoOp => Self::ValidationError(e.to_string()),
            CatalogApiError::DatabaseError(msg) => Self::BackendError(format!("Database error: {msg}")),
        }
    }
}

#[cfg(test)]
mod test {
    use actix_web::body::MessageBody;

    use super::*;

    fn body_of(err: &ServerError) -> String {
        let bytes = err.error_response().into_body().try_into_bytes().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn engine_errors_map_to_status_codes() {
        let cases = [
            (OrderFlowError::InvalidItems("items[0]: quantity must be at least 1".into()), StatusCode::BAD_REQUEST),
            (OrderFlowError::Validation("Both the order id and email are required".into()), StatusCode::BAD_REQUEST),
            (OrderFlowError::NotFound, StatusCode::NOT_FOUND),
            (OrderFlowError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (OrderFlowError::Gateway(GatewayError::Business("declined".into())), StatusCode::BAD_REQUEST),
            (OrderFlowError::Gateway(GatewayError::Auth("bad creds".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (OrderFlowError::Gateway(GatewayError::Unavailable("timeout".into())), StatusCode::BAD_GATEWAY),
            (OrderFlowError::DatabaseError("disk I/O error".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (e, status) in cases {
            assert_eq!(ServerError::from(e).status_code(), status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = ServerError::from(OrderFlowError::DatabaseError("no such table: orders".into()));
        assert_eq!(body_of(&err), r#"{"error":"An unexpected error occurred"}"#);
        let err = ServerError::from(OrderFlowError::Gateway(GatewayError::Business("Invalid buyer email".into())));
        assert_eq!(body_of(&err), r#"{"error":"PayU error: Invalid buyer email"}"#);
        let err = ServerError::from(OrderFlowError::NotFound);
        assert_eq!(body_of(&err), r#"{"error":"Order not found"}"#);
    }
}
