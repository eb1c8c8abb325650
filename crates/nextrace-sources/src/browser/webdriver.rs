//! Minimal W3C WebDriver client over plain HTTP.
//!
//! Only the handful of commands needed to load a page, interact with one
//! control and read the rendered source are implemented.

use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, trace, warn};

use crate::error::{SourceError, SourceResult};

/// Key under which W3C drivers return element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// HTTP client for one WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    http: Client,
    base_url: String,
}

impl WebDriverClient {
    /// Creates a client for the driver listening at `base_url`.
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the driver base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Starts a headless browser session.
    pub async fn new_session(&self) -> SourceResult<Session> {
        let value = self
            .command(Method::POST, "/session", Some(session_capabilities()))
            .await?;
        let id = session_id(&value)
            .ok_or_else(|| SourceError::browser("Driver returned no session id"))?;
        debug!(session = %id, driver = %self.base_url, "Started WebDriver session");
        Ok(Session {
            client: self.clone(),
            id,
            closed: false,
        })
    }

    async fn delete_session(&self, id: &str) {
        let path = format!("/session/{}", id);
        match self.command(Method::DELETE, &path, None).await {
            Ok(_) => debug!(session = %id, "Closed WebDriver session"),
            Err(e) => warn!(session = %id, error = %e, "Failed to close WebDriver session"),
        }
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> SourceResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        trace!(method = %method, url = %url, "Sending WebDriver command");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            SourceError::browser(format!("WebDriver request failed: {}", e)).with_source(e)
        })?;
        let status = response.status();
        let payload: Value = response.json().await.map_err(|e| {
            SourceError::browser(format!("Invalid WebDriver response: {}", e)).with_source(e)
        })?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            Ok(value)
        } else {
            Err(command_error(&value, status.as_u16()))
        }
    }
}

/// An open browser session.
///
/// [`Session::close`] ends it in place. A session dropped without being
/// closed, for example when an outer timeout cancels the read, is ended from
/// a background task on the current runtime.
#[derive(Debug)]
pub struct Session {
    client: WebDriverClient,
    id: String,
    closed: bool,
}

impl Session {
    /// Returns the session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Navigates to `url` and waits for the document to load.
    pub async fn navigate(&self, url: &str) -> SourceResult<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    /// Returns the URL of the current top-level document.
    pub async fn current_url(&self) -> SourceResult<String> {
        let value = self.command(Method::GET, "/url", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Finds the first element matching a CSS selector.
    pub async fn find(&self, css: &str) -> SourceResult<Option<String>> {
        let body = json!({ "using": "css selector", "value": css });
        match self.command(Method::POST, "/element", Some(body)).await {
            Ok(value) => Ok(element_id(&value)),
            Err(e) if e.message().starts_with("no such element") => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns true if an option or checkbox element is selected.
    pub async fn is_selected(&self, element: &str) -> SourceResult<bool> {
        let value = self
            .command(Method::GET, &format!("/element/{}/selected", element), None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    /// Clicks an element.
    pub async fn click(&self, element: &str) -> SourceResult<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element),
            Some(json!({})),
        )
        .await
        .map(|_| ())
    }

    /// Returns the serialized DOM of the current document.
    pub async fn page_source(&self) -> SourceResult<String> {
        let value = self.command(Method::GET, "/source", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Ends the session, closing the browser.
    pub async fn close(mut self) {
        self.client.delete_session(&self.id).await;
        self.closed = true;
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> SourceResult<Value> {
        let path = format!("/session/{}{}", self.id, path);
        self.client.command(method, &path, body).await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(session = %self.id, "No runtime to close abandoned WebDriver session");
            return;
        };
        debug!(session = %self.id, "Closing abandoned WebDriver session");
        let client = self.client.clone();
        let id = std::mem::take(&mut self.id);
        runtime.spawn(async move { client.delete_session(&id).await });
    }
}

/// Capabilities requesting a headless browser from whichever driver answers.
pub fn session_capabilities() -> Value {
    json!({
        "capabilities": {
            "alwaysMatch": {
                "goog:chromeOptions": { "args": ["--headless=new", "--disable-gpu"] },
                "moz:firefoxOptions": { "args": ["-headless"] }
            }
        }
    })
}

/// Reads the session id from a new-session response value.
pub fn session_id(value: &Value) -> Option<String> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Reads the element reference from a find-element response value.
pub fn element_id(value: &Value) -> Option<String> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Maps a WebDriver error value onto a browser error.
///
/// The message starts with the W3C error code (`"no such element"`).
pub fn command_error(value: &Value, status: u16) -> SourceError {
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or("");
    let text = format!("{} (HTTP {}): {}", code, status, message);
    if code == "timeout" || code == "script timeout" {
        SourceError::timeout(text)
    } else {
        SourceError::browser(text)
    }
}
