use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use conhub_connectors::ConnectorError;

pub mod connectors;
pub mod webhooks;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const RESOURCE_UPDATES_HEADER: &str = "X-Resource-Updates";

/// Webhook handler error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Missing {} header", SIGNATURE_HEADER)]
    MissingSignature,

    #[error("Invalid webhook signature")]
    InvalidSignature,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Connector(e) => e.kind(),
            ApiError::InvalidBody(_) => "invalid_body",
            ApiError::MissingSignature | ApiError::InvalidSignature => "unauthorized",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Connector(e) => match e {
                ConnectorError::NotFound(_) => StatusCode::NOT_FOUND,
                ConnectorError::AlreadyExists(_) => StatusCode::CONFLICT,
                ConnectorError::Validation(_) | ConnectorError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                ConnectorError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingSignature | ApiError::InvalidSignature => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }))
    }
}

/// Verify an HMAC-SHA256 signature, given as hex with an optional `sha256=` prefix.
pub fn verify_hmac_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signature = signature.trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature);
    let expected = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(payload);

    // Constant-time comparison
    mac.verify_slice(&expected).is_ok()
}
