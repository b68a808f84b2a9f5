use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use yggdrasil::{BoxError, RawResponse, ResponseBody, Transport};

/// What the next response body should do when read.
#[derive(Clone)]
pub enum BodyBehavior {
    Bytes(Vec<u8>),
    FailRead,
}

/// Transport double that answers every request with a canned response and
/// counts how often response bodies are released.
#[derive(Clone)]
pub struct CountingTransport {
    status: StatusCode,
    body: BodyBehavior,
    refuse: bool,
    pub released: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<SentRequest>>>,
}

#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: String,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl CountingTransport {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: BodyBehavior::Bytes(body.as_bytes().to_vec()),
            refuse: false,
            released: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_read(status: u16) -> Self {
        Self {
            body: BodyBehavior::FailRead,
            ..Self::new(status, "")
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new(200, "")
        }
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

struct CountingBody {
    behavior: BodyBehavior,
    released: Arc<AtomicUsize>,
}

impl Drop for CountingBody {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResponseBody for CountingBody {
    async fn read_all(self: Box<Self>) -> Result<Vec<u8>, BoxError> {
        match &self.behavior {
            BodyBehavior::Bytes(data) => Ok(data.clone()),
            BodyBehavior::FailRead => Err("connection reset by peer".into()),
        }
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn execute(&self, request: reqwest::Request) -> Result<RawResponse, BoxError> {
        self.sent.lock().unwrap().push(SentRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .map(<[u8]>::to_vec),
        });

        if self.refuse {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }

        Ok(RawResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: Box::new(CountingBody {
                behavior: self.body.clone(),
                released: Arc::clone(&self.released),
            }),
        })
    }
}
