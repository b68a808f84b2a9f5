pub mod error;
pub mod transport;
pub mod types;

pub use crate::error::{check_response, Error, ErrorResponse};
pub use crate::transport::{BoxError, RawResponse, Response, ResponseBody, Transport};
use crate::types::{
    Agent, AuthenticateRequest, AuthenticateResponse, AuthenticateResponseFull, RefreshRequest,
};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Request, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Origin of Mojang's authentication server.
pub const DEFAULT_BASE_URL: &str = "https://authserver.mojang.com/";

/// User agent sent unless the caller picks another one.
pub const DEFAULT_USER_AGENT: &str = concat!("yggdrasil-rs/", env!("CARGO_PKG_VERSION"));

const JSON: &str = "application/json";

/// Client for the Yggdrasil authentication service.
///
/// `base_url` and `user_agent` may be reassigned between calls. Sharing one
/// client between concurrent tasks is fine as long as nobody mutates it
/// while a call is in flight.
#[derive(Clone)]
pub struct YggdrasilClient {
    transport: Arc<dyn Transport>,
    /// Root all relative API paths are resolved against. Keep the trailing
    /// slash, otherwise the last path segment gets replaced.
    pub base_url: Url,
    /// Sent as `User-Agent`; left off entirely when empty.
    pub user_agent: String,
}

impl fmt::Debug for YggdrasilClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YggdrasilClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Default for YggdrasilClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YggdrasilClient {
    /// Creates a client backed by a default `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(reqwest::Client::new())
    }

    /// Creates a client that sends its requests through `transport`.
    ///
    /// Accepts a transport by value or an already shared
    /// `Arc<dyn Transport>`. Timeouts, proxies and TLS settings belong on
    /// the transport.
    ///
    /// # Panics
    /// Never in practice: only if `DEFAULT_BASE_URL` stopped being a valid URL.
    #[must_use]
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL");
        tracing::debug!("Creating YggdrasilClient with base URL: {}", base_url);
        Self {
            transport: Arc::new(transport),
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Sets a different base URL, e.g. a self-hosted authentication server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the user agent. An empty string suppresses the header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds an API request without sending it.
    ///
    /// `path` is resolved against `base_url` and must not start with a
    /// slash. When `body` is given it is sent as JSON with `<`, `>` and `&`
    /// left unescaped, followed by a newline. Pass `None::<&()>` for requests
    /// without a body.
    ///
    /// # Errors
    /// Returns an error if the path does not resolve, the body fails to
    /// serialize, or the user agent is not a valid header value.
    pub fn build_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Request, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path)?;

        let payload = match body {
            Some(body) => {
                let mut payload = serde_json::to_vec(body).map_err(Error::Encode)?;
                payload.push(b'\n');
                Some(payload)
            }
            None => None,
        };

        tracing::debug!("Building {} request for {}", method, url);
        let mut request = Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if payload.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
        if !self.user_agent.is_empty() {
            headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        }
        if let Some(payload) = payload {
            *request.body_mut() = Some(payload.into());
        }

        Ok(request)
    }

    /// Sends a request and decodes a 200 response body into `T`.
    ///
    /// The response head is returned next to the value. The body is released
    /// before this returns, whichever way it returns.
    ///
    /// # Errors
    /// Transport failures are passed through as [`Error::Transport`], non-200
    /// responses become [`Error::Api`], and bodies that do not match `T`
    /// become [`Error::Decode`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<(Response, T), Error> {
        let (response, body) = self.dispatch(request).await?;
        let data = match body.read_all().await {
            Ok(data) => data,
            Err(source) => return Err(Error::ReadBody { response, source }),
        };
        // Only the first JSON value counts; anything after it is ignored.
        let mut deserializer = serde_json::Deserializer::from_slice(&data);
        match T::deserialize(&mut deserializer) {
            Ok(value) => Ok((response, value)),
            Err(source) => Err(Error::Decode { response, source }),
        }
    }

    /// Sends a request and checks its status without decoding anything.
    ///
    /// # Errors
    /// Same as [`execute`](Self::execute), minus decode failures.
    pub async fn execute_raw(&self, request: Request) -> Result<Response, Error> {
        let (response, body) = self.dispatch(request).await?;
        drop(body);
        Ok(response)
    }

    async fn dispatch(
        &self,
        request: Request,
    ) -> Result<(Response, Box<dyn ResponseBody>), Error> {
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!("Sending {} {}", method, url);
        let raw = self
            .transport
            .execute(request)
            .await
            .map_err(Error::Transport)?;

        let response = Response {
            method,
            url,
            status: raw.status,
            headers: raw.headers,
        };
        let body = check_response(&response, raw.body).await?;
        Ok((response, body))
    }

    /// Authenticates with a username and password.
    ///
    /// Pass the same `client_token` later to refresh the access token without
    /// the password. User data is always requested.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service rejects the
    /// credentials, or the response cannot be parsed.
    pub async fn authenticate(
        &self,
        agent: &Agent,
        username: &str,
        password: &str,
        client_token: &str,
    ) -> Result<AuthenticateResponse, Error> {
        self.send_authenticate(agent, username, password, client_token)
            .await
    }

    /// Like [`authenticate`](Self::authenticate), but returns profiles and
    /// user data too.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service rejects the
    /// credentials, or the response cannot be parsed.
    pub async fn authenticate_full(
        &self,
        agent: &Agent,
        username: &str,
        password: &str,
        client_token: &str,
    ) -> Result<AuthenticateResponseFull, Error> {
        self.send_authenticate(agent, username, password, client_token)
            .await
    }

    async fn send_authenticate<T: DeserializeOwned>(
        &self,
        agent: &Agent,
        username: &str,
        password: &str,
        client_token: &str,
    ) -> Result<T, Error> {
        tracing::info!("Authenticating with Yggdrasil: agent={}", agent.name);
        let payload = AuthenticateRequest {
            agent,
            username,
            password,
            client_token,
            request_user: true,
        };
        let request = self.build_request(Method::POST, "authenticate", Some(&payload))?;
        let (_, response) = self.execute(request).await?;
        Ok(response)
    }

    /// Exchanges a still-known access token for a fresh one.
    ///
    /// `client_token` must be the one used when the access token was issued.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service rejects the
    /// tokens, or the response cannot be parsed.
    pub async fn refresh(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> Result<AuthenticateResponse, Error> {
        self.send_refresh(access_token, client_token).await
    }

    /// Like [`refresh`](Self::refresh), but returns the selected profile and
    /// user data too.
    ///
    /// # Errors
    /// Returns an error if the request fails, the service rejects the
    /// tokens, or the response cannot be parsed.
    pub async fn refresh_full(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> Result<AuthenticateResponseFull, Error> {
        self.send_refresh(access_token, client_token).await
    }

    async fn send_refresh<T: DeserializeOwned>(
        &self,
        access_token: &str,
        client_token: &str,
    ) -> Result<T, Error> {
        tracing::info!("Refreshing Yggdrasil access token");
        let payload = RefreshRequest {
            access_token,
            client_token,
            request_user: true,
        };
        let request = self.build_request(Method::POST, "refresh", Some(&payload))?;
        let (_, response) = self.execute(request).await?;
        Ok(response)
    }
}
