use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error};

use crate::error::AppError;

/// Parses a list of `key=value` strings into key-value pairs.
///
/// Each string is split at its first `=`; a string without one is rejected
/// with [`AppError::InvalidInput`].
///
/// # Examples
///
/// ```
/// use tsrec::utils::parse_params;
///
/// let params = vec![
///     "key1=value1".to_string(),
///     "key2=a=b".to_string(),
/// ];
/// let result = parse_params(&params).unwrap();
/// assert_eq!(result, vec![
///     ("key1".to_string(), "value1".to_string()),
///     ("key2".to_string(), "a=b".to_string()),
/// ]);
/// ```
pub fn parse_params(params: &[String]) -> Result<Vec<(String, String)>, AppError> {
    debug!("Parsing {} parameters", params.len());

    params
        .iter()
        .map(|param| {
            param
                .split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| {
                    error!("Invalid param format: {param}");
                    AppError::InvalidInput(format!("Invalid param format: {param}"))
                })
        })
        .collect()
}

/// Builds request headers from `name=value` strings.
pub fn parse_headers(headers: &[String]) -> Result<HeaderMap, AppError> {
    let mut map = HeaderMap::new();
    for (key, value) in parse_params(headers)? {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| AppError::InvalidInput(format!("Invalid header name `{key}`: {e}")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| AppError::InvalidInput(format!("Invalid header value for `{key}`: {e}")))?;
        debug!("Added header: {name}");
        map.insert(name, value);
    }
    Ok(map)
}
