//! Query parameter validation

use std::collections::HashMap;

use crate::ApiError;

/// Validated `count` / `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentParams {
    pub count: i64,
    pub offset: i64,
}

/// Validate the raw query map
///
/// `count` is required and must be > 0; `offset` is optional, defaults to 0
/// and must be >= 0.
pub fn parse_content_params(query: &HashMap<String, String>) -> Result<ContentParams, ApiError> {
    let count = int_param(query, "count", true, false)
        .map_err(|reason| ApiError::BadRequest(format!("invalid count parameter: {reason}")))?;
    let offset = int_param(query, "offset", false, true)
        .map_err(|reason| ApiError::BadRequest(format!("invalid offset parameter: {reason}")))?;

    Ok(ContentParams { count, offset })
}

fn int_param(
    query: &HashMap<String, String>,
    name: &str,
    required: bool,
    allow_zero: bool,
) -> Result<i64, &'static str> {
    let raw = query.get(name).map(String::as_str).unwrap_or_default();
    if raw.is_empty() {
        return if required { Err("is empty") } else { Ok(0) };
    }

    let value: i64 = raw.parse().map_err(|_| "must be an integer")?;
    match value {
        v if v < 0 && allow_zero => Err("must be positive or zero"),
        v if v <= 0 && !allow_zero => Err("must be positive"),
        v => Ok(v),
    }
}
