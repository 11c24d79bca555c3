// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

/// A mock HTTP service that returns predefined responses based on request
/// method and path. Unmatched requests get a Kubernetes-style 404.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    put_echoes: Arc<Mutex<Vec<String>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            ("GET".to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            ("POST".to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Echo the request body back for PUT requests matching the exact path
    pub fn on_put_echo(self, path: &str) -> Self {
        self.put_echoes.lock().unwrap().push(path.to_string());
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }

    fn echoes_put(&self, path: &str) -> bool {
        self.put_echoes.lock().unwrap().iter().any(|p| p == path)
    }
}

impl tower::Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let echo = method == "PUT" && self.echoes_put(&path);
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            if echo {
                let bytes: Bytes = req.into_body().collect().await?.to_bytes();
                return Ok(json_response(200, bytes.to_vec()));
            }
            match response {
                Some((status, body)) => Ok(json_response(status, body.into_bytes())),
                None => {
                    // Default 404 for unmatched requests
                    let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
                    Ok(json_response(404, body.as_bytes().to_vec()))
                }
            }
        })
    }
}

fn json_response(status: u16, body: Vec<u8>) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// JSON for a typed Kubernetes object
pub fn obj_json<T: Serialize>(obj: &T) -> String {
    serde_json::to_string(obj).unwrap()
}

/// JSON for a typed Kubernetes list response
pub fn list_json<T: Serialize>(kind: &str, items: &[T]) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": kind,
        "metadata": {},
        "items": items,
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}
