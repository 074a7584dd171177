//! Replayable request descriptions
//!
//! `reqwest::RequestBuilder` can't always be cloned (multipart bodies in
//! particular), so calls are described once and rebuilt for each attempt.

use super::error::{ClientError, GENERIC_FAILURE};
use bytes::Bytes;
use reqwest::{Method, header};
use serde::Serialize;

/// Request body
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    File {
        field: String,
        file_name: String,
        mime: String,
        contents: Bytes,
    },
}

/// One logical API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    payload: Payload,
    fallback_message: &'static str,
}

impl ApiRequest {
    /// Describe a call to `path` (relative to the client's base URL)
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::Empty,
            fallback_message: GENERIC_FAILURE,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.payload = Payload::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a form-encoded body
    #[must_use]
    pub fn form<K: Into<String>, V: Into<String>>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self {
        self.payload = Payload::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Attach a single file as a multipart form field
    #[must_use]
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        contents: Bytes,
    ) -> Self {
        self.payload = Payload::File {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            contents,
        };
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Message used when an error response carries none
    #[must_use]
    pub fn fallback_message(mut self, message: &'static str) -> Self {
        self.fallback_message = message;
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    pub(crate) const fn fallback(&self) -> &'static str {
        self.fallback_message
    }

    /// Build a fresh `reqwest` request for one attempt
    pub(crate) fn build(
        &self,
        client: &reqwest::Client,
        base_url: &str,
        bearer: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = format!("{base_url}{}", self.path);
        let mut request = client.request(self.method.clone(), url);

        if !self.query.is_empty() {
            request = request.query(&self.query);
        }

        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request = match &self.payload {
            Payload::Empty => request.header(header::CONTENT_TYPE, "application/json"),
            Payload::Json(body) => request.json(body),
            Payload::Form(fields) => request.form(fields),
            Payload::File {
                field,
                file_name,
                mime,
                contents,
            } => {
                let part = reqwest::multipart::Part::bytes(contents.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(mime)?;
                request.multipart(reqwest::multipart::Form::new().part(field.clone(), part))
            }
        };

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_is_captured() {
        let request = ApiRequest::post("/tasks/")
            .json(&serde_json::json!({ "title": "x" }))
            .unwrap();
        assert!(matches!(request.payload(), Payload::Json(v) if v["title"] == "x"));
        assert_eq!(*request.method(), Method::POST);
    }

    #[test]
    fn query_and_fallback() {
        let request = ApiRequest::get("/tasks/")
            .query("limit", 10)
            .fallback_message("Export failed");
        assert_eq!(request.query_pairs(), [("limit".to_string(), "10".to_string())]);
        assert_eq!(request.fallback(), "Export failed");
        assert_eq!(ApiRequest::get("/x").fallback(), GENERIC_FAILURE);
    }

    #[test]
    fn builds_with_bearer_and_json_content_type() {
        let client = reqwest::Client::new();
        let built = ApiRequest::get("/auth/me")
            .build(&client, "http://localhost:8000", Some("tok"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(built.url().as_str(), "http://localhost:8000/auth/me");
        assert_eq!(built.headers()[header::AUTHORIZATION], "Bearer tok");
        assert_eq!(built.headers()[header::CONTENT_TYPE], "application/json");
    }
}
