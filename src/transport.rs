//! The seam between [`YggdrasilClient`](crate::YggdrasilClient) and whatever
//! actually moves bytes over HTTP.
//!
//! The client never builds its own connection machinery. It hands a fully
//! formed [`reqwest::Request`] to a [`Transport`] and gets back a
//! [`RawResponse`] whose body is released when it is consumed or dropped.
//! `reqwest::Client` is the stock implementation; tests and callers with
//! special needs can plug in their own.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use std::fmt;
use std::sync::Arc;

/// Error type produced by transports. Passed through to callers untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Executes HTTP requests on behalf of the client.
///
/// Implementations must be safe to share between concurrent callers; the
/// client adds no pooling, queueing or timeouts of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response head plus an unread body.
    async fn execute(&self, request: reqwest::Request) -> Result<RawResponse, BoxError>;
}

/// A response body that has not been read yet.
///
/// Reading consumes the body. Dropping it without reading releases it as well.
#[async_trait]
pub trait ResponseBody: Send {
    /// Reads the remaining body to the end.
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>, BoxError>;
}

/// What a [`Transport`] hands back: status, headers and the pending body.
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Box<dyn ResponseBody>,
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Low-level details of a completed exchange, kept after the body is gone.
///
/// Returned next to decoded values and carried by errors, so callers can
/// look at the status code or headers without repeating the request.
#[derive(Debug, Clone)]
pub struct Response {
    /// Method of the request that produced this response
    pub method: Method,
    /// Fully resolved URL the request was sent to
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: reqwest::Request) -> Result<RawResponse, BoxError> {
        Transport::execute(&**self, request).await
    }
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: reqwest::Request) -> Result<RawResponse, BoxError> {
        let response = reqwest::Client::execute(self, request).await?;
        Ok(RawResponse {
            status: response.status(),
            headers: response.headers().clone(),
            body: Box::new(response),
        })
    }
}

#[async_trait]
impl ResponseBody for reqwest::Response {
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>, BoxError> {
        Ok(self.bytes().await?.to_vec())
    }
}
