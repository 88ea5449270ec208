//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Credential fields in
/// form submissions are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    // Multipart bodies are binary; buffering them through a lossy string
    // round-trip would corrupt the upload, so only the headers are logged.
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/"));

    if is_multipart {
        tracing::info!(
            "Received request: {} {} (multipart body omitted)",
            request.method(),
            request.uri()
        );

        let response = next.run(request).await;

        let (parts, body_text) = extract_header_and_body_text_from_response(response).await;
        log_response(&parts, &body_text);

        return Response::from_parts(parts, body_text.into());
    }

    let (parts, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_form_post = parts.method == axum::http::Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form_post {
        log_request(&parts, &redact_field(&body_text, "password"));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Replace the value of `field_name` in a form-urlencoded body with
/// asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    let start = match form_text.find(&format!("{field_name}=")) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(form_text.len());

    form_text.replace(&form_text[start..end], &format!("{field_name}=********"))
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::redact_field;

    #[test]
    fn redacts_the_password_field() {
        let body = "email=owner%40example.com&password=hunter2";

        assert_eq!(
            redact_field(body, "password"),
            "email=owner%40example.com&password=********"
        );
    }

    #[test]
    fn redacts_when_the_field_is_not_last() {
        let body = "password=hunter2&email=owner%40example.com";

        assert_eq!(
            redact_field(body, "password"),
            "password=********&email=owner%40example.com"
        );
    }

    #[test]
    fn leaves_bodies_without_the_field_untouched() {
        let body = "amount=12.34&type=in";

        assert_eq!(redact_field(body, "password"), body);
    }
}
