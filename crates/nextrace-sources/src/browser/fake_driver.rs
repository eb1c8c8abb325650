//! In-process WebDriver endpoint for adapter tests.
//!
//! Speaks just enough HTTP/1.1 and W3C JSON for one session on a season
//! listing page. Every request is recorded as `"METHOD /path"`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use super::webdriver::ELEMENT_KEY;

pub const SESSION: &str = "s1";

pub const SEASON_HTML: &str = r#"
<html><body><section class="calendario">
  <div class="info-card">
    <div class="fecha"><span class="dia">10</span><span class="mes">AGO</span><span class="hora">13:30</span></div>
    <h3 class="autodromo">Autódromo Ciudad de Rafaela</h3>
    <p class="localidad">Rafaela, Santa Fe</p>
  </div>
</section></body></html>
"#;

/// How the fake page behaves.
#[derive(Debug, Clone, Copy)]
pub struct PageBehavior {
    /// The year option exists.
    pub has_option: bool,
    /// The year option starts selected.
    pub preselected: bool,
    /// Clicking the option renders the season.
    pub settles: bool,
    /// Reading the page source never answers.
    pub hang_source: bool,
}

impl Default for PageBehavior {
    fn default() -> Self {
        Self {
            has_option: true,
            preselected: false,
            settles: true,
            hang_source: false,
        }
    }
}

#[derive(Debug)]
struct DriverState {
    behavior: PageBehavior,
    selected: AtomicBool,
    log: Mutex<Vec<String>>,
}

/// A running fake driver.
#[derive(Debug, Clone)]
pub struct FakeDriver {
    url: String,
    state: Arc<DriverState>,
}

impl FakeDriver {
    pub async fn start(behavior: PageBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(DriverState {
            behavior,
            selected: AtomicBool::new(behavior.preselected),
            log: Mutex::new(Vec::new()),
        });

        let accept_state = state.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle(stream, accept_state.clone()));
            }
        });
        Self { url, state }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn received(&self, request: &str) -> bool {
        self.requests().iter().any(|r| r == request)
    }
}

async fn handle(mut stream: TcpStream, state: Arc<DriverState>) {
    let (read, mut write) = stream.split();
    let mut reader = BufReader::new(read);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).await.unwrap_or(0) == 0 || header == "\r\n" {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).await.is_err() {
        return;
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.log.lock().unwrap().push(format!("{} {}", method, path));
    let Some((status, value)) = route(&state, &method, &path, &body) else {
        std::future::pending::<()>().await;
        return;
    };

    let payload = json!({ "value": value }).to_string();
    let response = format!(
        "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        payload.len(),
        payload
    );
    let _ = write.write_all(response.as_bytes()).await;
    let _ = write.shutdown().await;
}

fn no_such_element() -> (u16, Value) {
    (404, json!({ "error": "no such element", "message": "Unable to locate element" }))
}

fn route(state: &DriverState, method: &str, path: &str, body: &Value) -> Option<(u16, Value)> {
    let behavior = state.behavior;
    if method == "POST" && path == "/session" {
        return Some((200, json!({ "sessionId": SESSION, "capabilities": {} })));
    }

    let prefix = format!("/session/{}", SESSION);
    let command = path.strip_prefix(&prefix)?;
    let selected = state.selected.load(Ordering::SeqCst);

    Some(match (method, command) {
        ("DELETE", "") => (200, Value::Null),
        ("POST", "/url") => (200, Value::Null),
        ("GET", "/url") => (200, json!("https://actc.org.ar/tc/calendario.html")),
        ("POST", "/element") => {
            let css = body["value"].as_str().unwrap_or_default();
            let found = if css.starts_with("select#anio") {
                behavior.has_option.then_some("opt")
            } else {
                selected.then_some("card")
            };
            match found {
                Some(id) => (200, json!({ ELEMENT_KEY: id })),
                None => no_such_element(),
            }
        }
        ("GET", "/element/opt/selected") => (200, json!(selected)),
        ("POST", "/element/opt/click") => {
            if behavior.settles {
                state.selected.store(true, Ordering::SeqCst);
            }
            (200, Value::Null)
        }
        ("GET", "/source") if behavior.hang_source => return None,
        ("GET", "/source") => (200, json!(SEASON_HTML)),
        _ => (404, json!({ "error": "unknown command", "message": path })),
    })
}
