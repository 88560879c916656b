//! # Transport Layer
//!
//! The panel never talks HTTP directly. Every request goes through the
//! [`ApiClient`] trait: a method, a server-absolute path (query string
//! included) and an optional JSON body in, a decoded JSON body or an error out.
//!
//! ## Implementations
//!
//! - [`http::HttpApiClient`]: production client over `reqwest`'s blocking API.
//!   Attaches the ambient credentials (bearer token and/or `X-Api-Key`) and maps
//!   non-success responses to [`ChaospadError::Api`](crate::error::ChaospadError::Api)
//!   with the backend's `detail` message.
//!
//! - [`memory::InMemoryBackend`]: emulates the pads routes in memory. It records
//!   every request and can be told to fail, which is what the panel tests are
//!   built on.
//!
//! Keeping the trait this small lets tests assert on exactly what went over the
//! wire without a server.

use crate::error::Result;
use serde_json::Value;
use std::fmt;

pub mod http;
pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract request wrapper the panel issues all REST calls through.
pub trait ApiClient {
    /// Send one request.
    ///
    /// An empty response body decodes to `Value::Null`.
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value>;
}

impl<C: ApiClient + ?Sized> ApiClient for Box<C> {
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        (**self).request(method, path, body)
    }
}

impl<C: ApiClient + ?Sized> ApiClient for &mut C {
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        (**self).request(method, path, body)
    }
}
