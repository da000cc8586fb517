//! Raw credential extraction from request headers

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap,
};

/// Value of the `Authorization` header, if present and valid UTF-8
pub fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Value of the named cookie.
///
/// Every `Cookie` header is scanned; the first pair with a matching name wins.
pub fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == cookie_name).then(|| val.trim().to_string())
        })
}
