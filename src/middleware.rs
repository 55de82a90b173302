use crate::config::Config;
use actix_web::{
    Error,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{self, HeaderName, HeaderValue},
    middleware::Next,
    web::Data,
};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// CORS headers for a response, given the configured origin and the request's `Origin`.
///
/// A wildcard is never sent together with credentials: with `*` configured, a
/// request carrying an `Origin` gets that origin echoed back.
pub fn cors_headers(allowed: &str, origin: Option<&str>) -> Vec<(HeaderName, String)> {
    let mut headers = vec![
        (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS.to_string()),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS.to_string()),
    ];

    match (allowed, origin) {
        ("*", None) => {
            headers.push((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()));
        }
        ("*", Some(origin)) => {
            headers.push((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.to_string()));
            headers.push((header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true".to_string()));
            headers.push((header::VARY, "Origin".to_string()));
        }
        (fixed, _) => {
            headers.push((header::ACCESS_CONTROL_ALLOW_ORIGIN, fixed.to_string()));
            headers.push((header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true".to_string()));
        }
    }

    headers
}

pub async fn cors_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let allowed = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .cors_allow_origin
        .clone();

    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut res = next.call(req).await?;

    for (name, value) in cors_headers(&allowed, origin.as_deref()) {
        let value =
            HeaderValue::from_str(&value).map_err(actix_web::error::ErrorInternalServerError)?;
        res.headers_mut().insert(name, value);
    }

    Ok(res)
}
