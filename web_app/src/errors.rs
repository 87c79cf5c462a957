use crate::consts;
use derive_more::{Display, Error};
use log::error;
use ntex::{http, web};

/// Errors answered to the webhook caller
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    #[display("invalid X-Line-Signature")]
    InvalidSignature,
    #[display("malformed webhook payload: {_0}")]
    MalformedPayload(#[error(not(source))] String),
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self);

        let body = match self {
            WebhookError::InvalidSignature => consts::INVALID_SIGNATURE_BODY.to_string(),
            WebhookError::MalformedPayload(_) => "Malformed payload".to_string(),
        };

        web::HttpResponse::build(self.status_code())
            .set_header("content-type", "text/plain; charset=utf-8")
            .body(body)
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::InvalidSignature => http::StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}

/// Failures inside the per-event pipeline, handed to the fallback handler
#[derive(Debug, Display, Error)]
pub enum DispatchError {
    #[display("reply failed: {_0}")]
    Reply(#[error(not(source))] String),
}
