//! In-process HTTP driver.
//!
//! Sends requests straight into an axum `Router` through `tower::ServiceExt`,
//! so no socket or server task is needed.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt as _;

use crate::session::MockSession;

/// Decoded response: status, headers and the body parsed as JSON
/// (`Value::Null` when the body is empty or not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `kind` field of an error body.
    pub fn kind(&self) -> &str {
        self.body["kind"].as_str().unwrap_or_default()
    }
}

/// Wraps a router for request/response round trips in tests.
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub async fn get(&self, uri: &str, session: Option<MockSession>) -> TestResponse {
        let request = build(Method::GET, uri, session, Body::empty(), None);
        self.send(request).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(
        &self,
        uri: &str,
        form: &[(&str, &str)],
        session: Option<MockSession>,
    ) -> TestResponse {
        let encoded = serde_urlencoded::to_string(form).expect("form fields encode");
        let request = build(
            Method::POST,
            uri,
            session,
            Body::from(encoded),
            Some("application/x-www-form-urlencoded"),
        );
        self.send(request).await
    }

    /// POST a `multipart/form-data` body of text parts.
    pub async fn post_multipart(
        &self,
        uri: &str,
        form: &[(&str, &str)],
        session: Option<MockSession>,
    ) -> TestResponse {
        const BOUNDARY: &str = "slotbook-test-boundary";
        let mut body = String::new();
        for (name, value) in form {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        let request = build(
            Method::POST,
            uri,
            session,
            Body::from(body),
            Some(&content_type),
        );
        self.send(request).await
    }

    /// POST with no body and no content type.
    pub async fn post_empty(&self, uri: &str, session: Option<MockSession>) -> TestResponse {
        let request = build(Method::POST, uri, session, Body::empty(), None);
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let resp = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

fn build(
    method: Method,
    uri: &str,
    session: Option<MockSession>,
    body: Body,
    content_type: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, session.cookie());
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).expect("valid test request")
}
