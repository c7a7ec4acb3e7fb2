//! Status checking and body decoding for PayPal responses.

use serde::de::DeserializeOwned;

use crate::error::{ApiErrorResponse, PayPalError};
use crate::http::HttpResponse;

/// Decode a 2xx body into `T`, or map a non-2xx response to an error.
pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, PayPalError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| PayPalError::ResponseDecode {
        message: e.to_string(),
        body: response.body,
    })
}

/// Accept any 2xx response and discard its body.
pub fn expect_success(response: HttpResponse) -> Result<(), PayPalError> {
    check_status(&response)
}

/// Map non-2xx status codes to `Api` when the body is a PayPal error
/// document, `HttpStatus` otherwise.
fn check_status(response: &HttpResponse) -> Result<(), PayPalError> {
    if response.is_success() {
        return Ok(());
    }
    match serde_json::from_str::<ApiErrorResponse>(&response.body) {
        Ok(error) => Err(PayPalError::Api {
            status: response.status,
            error,
        }),
        Err(_) => Err(PayPalError::HttpStatus {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}
