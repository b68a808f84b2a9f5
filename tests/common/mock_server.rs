use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yggdrasil::YggdrasilClient;

#[derive(Deserialize)]
pub struct Fixture {
    pub request: FixtureRequest,
    pub response: FixtureResponse,
}

#[derive(Deserialize)]
pub struct FixtureRequest {
    pub method: String,
    pub path: String,
}

#[derive(Deserialize)]
pub struct FixtureResponse {
    pub status_code: u16,
    /// JSON body, sent as `application/json`
    pub body: Option<serde_json::Value>,
    /// Verbatim body for responses that are not (valid) JSON
    pub raw_body: Option<String>,
}

pub struct YggdrasilMock {
    pub server: MockServer,
}

impl YggdrasilMock {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    pub async fn mount_fixture(&self, fixture_path: &str) {
        let full_path = Self::fixtures_dir().join(fixture_path);

        let content = fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", full_path.display(), e));

        let fixture: Fixture = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", full_path.display(), e));

        let mut template = ResponseTemplate::new(fixture.response.status_code);
        if let Some(body) = &fixture.response.body {
            template = template.set_body_json(body);
        } else if let Some(raw) = fixture.response.raw_body {
            template = template.set_body_raw(raw, "text/html");
        }

        Mock::given(method(fixture.request.method.as_str()))
            .and(path(fixture.request.path.as_str()))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Base URL of the mock server, with the trailing slash relative paths need.
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("{}/", self.server.uri())).unwrap()
    }

    pub fn client(&self) -> YggdrasilClient {
        YggdrasilClient::new().with_base_url(self.base_url())
    }
}
