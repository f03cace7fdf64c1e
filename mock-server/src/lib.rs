//! In-process imitation of the Akismet REST API.
//!
//! Routes are `POST /{key}/{endpoint}`, matching a client endpoint template
//! of `http://<addr>/{key}/{endpoint}`. Every request is recorded so tests
//! can assert on the exact wire body.

use std::{collections::HashMap, collections::HashSet, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const SUBMIT_ACK: &str = "Thanks for making the web a better place.";
pub const GUARANTEED_SPAM_AUTHOR: &str = "akismet-guaranteed-spam";
pub const GUARANTEED_SPAM_EMAIL: &str = "akismet-guaranteed-spam@example.com";
pub const DEFAULT_KEY: &str = "deadbeef";

/// A request as the server saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub key: String,
    pub endpoint: String,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Decoded form fields of the body.
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }
}

/// Shared server state. Clones share the request log.
#[derive(Clone, Debug)]
pub struct MockState {
    valid_keys: Arc<HashSet<String>>,
    scripted: Option<(StatusCode, String)>,
    delay: Option<Duration>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self::with_keys([DEFAULT_KEY])
    }
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            valid_keys: Arc::new(keys.into_iter().map(Into::into).collect()),
            scripted: None,
            delay: None,
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Answer every request with `status` and `body`, ignoring the contract.
    pub fn scripted(mut self, status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.scripted = Some((status, body.into()));
        self
    }

    /// Hold every response for `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    fn accepts(&self, key: &str) -> bool {
        self.valid_keys.contains(key)
    }
}

pub fn app() -> Router {
    app_with(MockState::default())
}

pub fn app_with(state: MockState) -> Router {
    Router::new()
        .route("/{key}/{endpoint}", post(handle))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock akismet listening on {addr}");
    }
    axum::serve(listener, app_with(state)).await
}

async fn handle(
    State(state): State<MockState>,
    Path((key, endpoint)): Path<(String, String)>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    debug!(%key, %endpoint, "mock request");
    let recorded = RecordedRequest {
        key,
        endpoint,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    };
    state.requests.write().await.push(recorded.clone());

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, body)) = &state.scripted {
        return (*status, body.clone());
    }
    respond(&state, &recorded)
}

/// The Akismet contract for one request.
fn respond(state: &MockState, request: &RecordedRequest) -> (StatusCode, String) {
    let form = request.form();
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or("");
    let key_ok = state.accepts(&request.key);

    let body = match request.endpoint.as_str() {
        "verify-key" => {
            if key_ok && !field("blog").is_empty() {
                "valid"
            } else {
                "invalid"
            }
        }
        "comment-check" => {
            if !key_ok {
                "invalid"
            } else if let Some(missing) = missing_field(&form) {
                return (StatusCode::OK, format!("Missing required field: {missing}."));
            } else if field("comment_author") == GUARANTEED_SPAM_AUTHOR
                || field("comment_author_email") == GUARANTEED_SPAM_EMAIL
            {
                "true"
            } else {
                "false"
            }
        }
        "submit-spam" | "submit-ham" => {
            if !key_ok {
                "invalid"
            } else if let Some(missing) = missing_field(&form) {
                return (StatusCode::OK, format!("Missing required field: {missing}."));
            } else {
                SUBMIT_ACK
            }
        }
        _ => return (StatusCode::NOT_FOUND, String::new()),
    };
    (StatusCode::OK, body.to_string())
}

fn missing_field(form: &HashMap<String, String>) -> Option<&'static str> {
    ["user_ip", "user_agent", "blog"]
        .into_iter()
        .find(|name| form.get(*name).map_or(true, String::is_empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(key: &str, endpoint: &str, body: &str) -> RecordedRequest {
        RecordedRequest {
            key: key.to_string(),
            endpoint: endpoint.to_string(),
            content_type: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn form_decodes_body() {
        let body = "blog=http%3A%2F%2Fa.com&user_agent=Mozilla%2F6.16";
        let form = request("k", "comment-check", body).form();
        assert_eq!(form["blog"], "http://a.com");
        assert_eq!(form["user_agent"], "Mozilla/6.16");
    }

    #[test]
    fn verify_needs_known_key_and_blog() {
        let state = MockState::default();
        let ok = respond(&state, &request(DEFAULT_KEY, "verify-key", "blog=x&key=deadbeef"));
        assert_eq!(ok, (StatusCode::OK, "valid".to_string()));
        let bad = respond(&state, &request("nope", "verify-key", "blog=x&key=nope"));
        assert_eq!(bad.1, "invalid");
        let no_blog = respond(&state, &request(DEFAULT_KEY, "verify-key", "key=deadbeef"));
        assert_eq!(no_blog.1, "invalid");
    }

    #[test]
    fn comment_check_reports_first_missing_field() {
        let state = MockState::default();
        let (_, body) = respond(&state, &request(DEFAULT_KEY, "comment-check", "blog=x"));
        assert_eq!(body, "Missing required field: user_ip.");
        let no_agent = request(DEFAULT_KEY, "comment-check", "blog=x&user_ip=1");
        let (_, body) = respond(&state, &no_agent);
        assert_eq!(body, "Missing required field: user_agent.");
    }

    #[test]
    fn comment_check_guaranteed_spam() {
        let state = MockState::default();
        let body = "blog=x&comment_author=akismet-guaranteed-spam&user_agent=a&user_ip=1";
        let (_, verdict) = respond(&state, &request(DEFAULT_KEY, "comment-check", body));
        assert_eq!(verdict, "true");
        let ham = request(DEFAULT_KEY, "comment-check", "blog=x&user_agent=a&user_ip=1");
        let (_, verdict) = respond(&state, &ham);
        assert_eq!(verdict, "false");
    }

    #[test]
    fn unknown_endpoint_is_404() {
        let (status, _) = respond(&MockState::default(), &request(DEFAULT_KEY, "nope", ""));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn scripted_status_falls_back_on_invalid_code() {
        let state = MockState::default().scripted(1000, "x");
        assert_eq!(state.scripted.unwrap().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
