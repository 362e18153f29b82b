#![forbid(unsafe_code)]

//! HTTP collaborator contract.
//!
//! The runtime consumes an HTTP client but does not implement one: this
//! crate defines only the call contract a transport must satisfy, plus the
//! value and error types that cross it. Components receive a client
//! explicitly at construction — there is no shared default instance, and no
//! ambient global state.
//!
//! # Contract
//!
//! `request(endpoint, method, body, headers)` resolves to a [`Response`]
//! when the transport got a 2xx status. It fails with
//! [`HttpError::Status`] carrying the full failed response for any other
//! status, and with the distinct [`HttpError::Timeout`] when the
//! transport's configured duration elapsed first. The `get`/`post`/`put`/
//! `delete`/`patch` helpers are thin method-fixed wrappers over `request`.
//!
//! Under the runtime's single-threaded cooperative model the call is
//! expressed as a blocking `Result`; callers are expected to catch the
//! error and store a message in component state, which then drives a
//! re-render.

use joko_reactive::Value;
use web_time::Duration;

/// Request method for the collaborator contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        };
        f.write_str(name)
    }
}

/// Header list in source order.
pub type Headers = Vec<(String, String)>;

/// A settled response from the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Whether the status is in the 2xx range.
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    /// Decoded body payload.
    pub data: Value,
}

impl Response {
    /// Build a response, deriving `ok` from the status code.
    #[must_use]
    pub fn with_status(status: u16, status_text: impl Into<String>, data: Value) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status,
            status_text: status_text.into(),
            headers: Headers::new(),
            data,
        }
    }
}

/// Failure modes of the collaborator contract.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum HttpError {
    /// Non-2xx response; carries the full failed response.
    #[error("request failed with status {}", .response.status)]
    Status { response: Response },

    /// The configured duration elapsed before the request completed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl HttpError {
    #[must_use]
    pub fn status(response: Response) -> Self {
        Self::Status { response }
    }

    /// The failed response, when this is a status error.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Status { response } => Some(response),
            Self::Timeout(_) => None,
        }
    }
}

/// The transport capability the runtime consumes.
///
/// Implementations own interceptors, timeout enforcement, and the actual
/// wire work; none of that is visible through this trait.
pub trait HttpClient {
    fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
        headers: &[(String, String)],
    ) -> Result<Response, HttpError>;

    fn get(&self, endpoint: &str) -> Result<Response, HttpError> {
        self.request(endpoint, Method::Get, None, &[])
    }

    fn post(&self, endpoint: &str, body: Value) -> Result<Response, HttpError> {
        self.request(endpoint, Method::Post, Some(body), &[])
    }

    fn put(&self, endpoint: &str, body: Value) -> Result<Response, HttpError> {
        self.request(endpoint, Method::Put, Some(body), &[])
    }

    fn delete(&self, endpoint: &str) -> Result<Response, HttpError> {
        self.request(endpoint, Method::Delete, None, &[])
    }

    fn patch(&self, endpoint: &str, body: Value) -> Result<Response, HttpError> {
        self.request(endpoint, Method::Patch, Some(body), &[])
    }
}
