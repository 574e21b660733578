use axum::http::{header::ORIGIN, HeaderMap, HeaderValue};

/// Cross-origin permission headers for the browser-facing webhook endpoints.
/// The request's own origin is echoed when it is in the allow-list, otherwise
/// the first allow-list entry is used.
pub fn cors_headers(allowed_origins: &[String], origin: Option<&str>) -> HeaderMap {
    let allowed = origin
        .filter(|candidate| allowed_origins.iter().any(|entry| entry == candidate))
        .or_else(|| allowed_origins.first().map(String::as_str))
        .unwrap_or_default();

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(allowed) {
        headers.insert("Access-Control-Allow-Origin", value);
    }
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );

    headers
}

/// The `Origin` header of an inbound request, if any.
pub fn request_origin(headers: &HeaderMap) -> Option<&str> {
    headers.get(ORIGIN).and_then(|value| value.to_str().ok())
}
