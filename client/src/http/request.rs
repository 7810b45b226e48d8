use crate::common::{ApiError, ApiResult};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A file uploaded as one part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Body of an [`ApiRequest`]. Kept in owned form so the request can be
/// replayed after a token refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FilePart>),
}

/// Replayable description of a request to the backend.
///
/// `retried` records whether the request has already been replayed after a
/// token refresh; a request is replayed at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub retried: bool,
    pub refresh_on_unauthorized: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried: false,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Adds a query parameter when `value` is present.
    pub fn with_query(mut self, key: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode {
            reason: format!("failed to encode request body: {e}"),
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Adds a file to a multipart body, replacing any JSON body.
    pub fn with_file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let part = FilePart {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
        };
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push(part),
            body => *body = RequestBody::Multipart(vec![part]),
        }
        self
    }

    /// Marks a request whose 401 means "bad credentials" rather than
    /// "expired session", e.g. the login call itself.
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    pub(crate) fn multipart_form(parts: &[FilePart]) -> reqwest::multipart::Form {
        parts.iter().fold(reqwest::multipart::Form::new(), |form, part| {
            form.part(
                part.field.clone(),
                reqwest::multipart::Part::bytes(part.bytes.clone())
                    .file_name(part.file_name.clone()),
            )
        })
    }
}

/// Successful response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decodes the body. An empty body decodes as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode {
            reason: e.to_string(),
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
