//! Service error taxonomy and HTTP mapping.
//!
//! Three failure classes cross the transport boundary: a body that does not
//! decode, a decoded receipt that fails validation, and a lookup for an id
//! that was never issued. Clients always receive a fixed plain-text body;
//! the specific cause is logged server-side and drives the rejection
//! metrics label.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::ReceiptId;
use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request body was not decodable as a receipt document.
    #[error("request body is not a receipt document: {detail}")]
    MalformedJson { detail: String },

    /// Receipt decoded but failed a validation check.
    #[error(transparent)]
    InvalidReceipt(#[from] ValidationError),

    /// No stored receipt under the requested id.
    #[error("no receipt stored under id '{id}'")]
    ReceiptNotFound { id: ReceiptId },
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedJson { .. } | Self::InvalidReceipt(_) => StatusCode::BAD_REQUEST,
            Self::ReceiptNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Label for the rejection counter family.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::InvalidReceipt(_) => "validation_error",
            Self::ReceiptNotFound { .. } => "not_found",
        }
    }

    /// The fixed text sent to clients. Field-level detail never leaves the
    /// server log.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } | Self::InvalidReceipt(_) => "The receipt is invalid.",
            Self::ReceiptNotFound { .. } => "No receipt found for that ID.",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            Self::ReceiptNotFound { .. } => {
                debug!(category = self.category(), error = %self, "request rejected");
            }
            _ => {
                warn!(category = self.category(), error = %self, "request rejected");
            }
        }
        (status, self.client_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_receipts_map_to_400_with_the_canonical_body() {
        let err = ServiceError::MalformedJson {
            detail: "expected value at line 1".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "The receipt is invalid.");
        assert_eq!(err.category(), "malformed_json");

        let err = ServiceError::from(ValidationError::NoItems);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "The receipt is invalid.");
        assert_eq!(err.category(), "validation_error");
    }

    #[test]
    fn unknown_ids_map_to_404_with_the_canonical_body() {
        let err = ServiceError::ReceiptNotFound {
            id: ReceiptId("missing".to_string()),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "No receipt found for that ID.");
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn validation_detail_stays_out_of_the_client_body() {
        let err = ServiceError::from(ValidationError::InvalidTotal {
            value: "10.0".to_string(),
        });
        assert!(err.to_string().contains("10.0"));
        assert!(!err.client_message().contains("10.0"));
    }
}
