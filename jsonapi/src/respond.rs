//! `http::Response` builders for JSON:API payloads.

use http::header::{CONTENT_TYPE as CONTENT_TYPE_HEADER, HeaderValue};
use http::{Response, StatusCode};

use crate::config::current;
use crate::{CONTENT_TYPE, ErrorObject, JsonApiError, MarshalParams, Payload};

/// Marshal `payload` into a response with the JSON:API media type.
pub fn respond<P: Payload + ?Sized>(
    status: StatusCode,
    payload: &P,
) -> Result<Response<Vec<u8>>, JsonApiError> {
    let body = current().marshal(payload)?;
    Ok(build(status, body))
}

/// Marshal an errors-only document into a response.
pub fn respond_errors(
    status: StatusCode,
    params: &MarshalParams,
    errors: &[ErrorObject],
) -> Result<Response<Vec<u8>>, JsonApiError> {
    let body = current().marshal_errors(params, errors)?;
    Ok(build(status, body))
}

/// Report a failed marshal as an error document.
///
/// The error is rendered with [`JsonApiError::to_error_object`] under
/// `500 Internal Server Error`.
pub fn respond_failure(error: &JsonApiError) -> Result<Response<Vec<u8>>, JsonApiError> {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let mut object = error.to_error_object(status.as_u16());
    object.title = status.canonical_reason().map(str::to_string);
    respond_errors(status, &MarshalParams::default(), &[object])
}

fn build(status: StatusCode, body: Vec<u8>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE_HEADER, HeaderValue::from_static(CONTENT_TYPE));
    response
}
