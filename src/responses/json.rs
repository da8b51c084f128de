use astra::{Body, ResponseBuilder};
use serde::Serialize;

use crate::errors::{ResultResp, ServerError};

pub fn json_response<T: Serialize>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|_| ServerError::InternalError)?;

    let resp = ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "application/json; charset=utf-8")
        .body(Body::from(body))
        .unwrap();

    Ok(resp)
}

pub fn no_content() -> ResultResp {
    let resp = ResponseBuilder::new()
        .status(204)
        .body(Body::empty())
        .unwrap();

    Ok(resp)
}
