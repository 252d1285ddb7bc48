/// Locating the session token on an inbound request
///
/// A token may arrive in the `Authorization: Bearer <token>` header or in the
/// `access_token` cookie. The header wins when both are present.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use betony_shared::auth::token_source::token_from_headers;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, HeaderValue::from_static("access_token=from-cookie"));
/// headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
///
/// assert_eq!(token_from_headers(&headers), Some("from-header"));
/// ```

use axum::http::{header, HeaderMap};

/// Name of the cookie carrying the session token
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Returns the session token carried by the request, if any
///
/// An `Authorization` header that is not a well-formed bearer credential is
/// ignored and the cookie is consulted instead.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_value(headers, ACCESS_TOKEN_COOKIE))
}

/// Extracts the credential from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();

    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token)
}

/// Reads one cookie from every `Cookie` header on the request
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value storing a session token
pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ACCESS_TOKEN_COOKIE, token, max_age_seconds
    )
}

/// `Set-Cookie` value clearing the session token
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        ACCESS_TOKEN_COOKIE
    )
}
