use actix_web::{error, HttpResponse};
use actix_web::http::StatusCode;
use derive_more::{Display, Error};
use crate::server::model::preview::ErrorResponse;
use crate::server::validation::ValidationErrors;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("Invalid invoice data")]
    BadRequest,
    #[display("Invalid invoice data")]
    InvalidInvoice { errors: ValidationErrors },
    #[display("No invoice data available")]
    NoInvoiceData,
    #[display("Failed to generate PDF")]
    RenderFailed,
    #[display("timeout occurred")]
    Timeout,
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::BadRequest | CustomError::InvalidInvoice { .. } => StatusCode::BAD_REQUEST,
            CustomError::NoInvoiceData => StatusCode::NOT_FOUND,
            CustomError::RenderFailed => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let fields = match self {
            CustomError::InvalidInvoice { errors } => Some(errors.clone()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            fields,
        })
    }
}
