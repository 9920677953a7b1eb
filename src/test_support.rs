//! In-process stand-in for the backend used by unit tests.
use std::fmt::Write as _;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::error::{AppError, AppResult};

const IO_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::metrics(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

#[derive(Debug, Clone)]
pub(crate) struct MockRequest {
    pub(crate) method: String,
    /// Path plus query, e.g. `/rest-api/v1/admin?role=ROLE_STUDENT&page=0&size=25`.
    pub(crate) target: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: String,
}

impl MockRequest {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MockResponse {
    pub(crate) status: u16,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: String,
}

impl MockResponse {
    pub(crate) fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
            body: body.to_string(),
        }
    }

    pub(crate) fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_owned(),
        }
    }

    pub(crate) fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

type Handler = Arc<dyn Fn(&MockRequest) -> MockResponse + Send + Sync>;

pub(crate) struct MockServer {
    pub(crate) base_url: Url,
    requests: Arc<Mutex<Vec<MockRequest>>>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub(crate) async fn spawn<F>(handler: F) -> AppResult<Self>
    where
        F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| AppError::validation(format!("Failed to bind mock server: {}", err)))?;
        let addr = listener
            .local_addr()
            .map_err(|err| AppError::validation(format!("Failed to read mock addr: {}", err)))?;
        let base_url = Url::parse(&format!("http://{}/", addr))
            .map_err(|err| AppError::validation(format!("Invalid mock url: {}", err)))?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);

        let seen = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    drop(serve(stream, &handler, &seen).await);
                });
            }
        });

        Ok(Self {
            base_url,
            requests,
            task,
        })
    }

    pub(crate) fn requests(&self) -> AppResult<Vec<MockRequest>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .map_err(|err| AppError::validation(format!("Mock request log poisoned: {}", err)))
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    handler: &Handler,
    seen: &Mutex<Vec<MockRequest>>,
) -> AppResult<()> {
    let request = read_request(&mut stream).await?;
    let response = handler(&request);
    if let Ok(mut log) = seen.lock() {
        log.push(request);
    }

    let mut head = format!(
        "HTTP/1.1 {} Mock\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        response.body.len()
    );
    for (name, value) in &response.headers {
        drop(write!(head, "{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    head.push_str(&response.body);

    timeout(IO_TIMEOUT, stream.write_all(head.as_bytes()))
        .await
        .map_err(|_err| AppError::validation("Mock write timed out"))?
        .map_err(|err| AppError::validation(format!("Mock write failed: {}", err)))?;
    drop(stream.shutdown().await);
    Ok(())
}

async fn read_request(stream: &mut TcpStream) -> AppResult<MockRequest> {
    let mut raw = Vec::with_capacity(1024);
    let header_end = loop {
        let mut chunk = [0_u8; 1024];
        let read = timeout(IO_TIMEOUT, stream.read(&mut chunk))
            .await
            .map_err(|_err| AppError::validation("Mock read timed out"))?
            .map_err(|err| AppError::validation(format!("Mock read failed: {}", err)))?;
        if read == 0 {
            return Err(AppError::validation("Connection closed before headers"));
        }
        raw.extend_from_slice(chunk.get(..read).unwrap_or_default());
        if let Some(pos) = raw.windows(4).position(|bytes| bytes == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(raw.get(..header_end).unwrap_or_default()).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = raw.get(header_end.saturating_add(4)..).unwrap_or_default().to_vec();
    while body.len() < content_length {
        let mut chunk = [0_u8; 1024];
        let read = timeout(IO_TIMEOUT, stream.read(&mut chunk))
            .await
            .map_err(|_err| AppError::validation("Mock body read timed out"))?
            .map_err(|err| AppError::validation(format!("Mock body read failed: {}", err)))?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(chunk.get(..read).unwrap_or_default());
    }

    Ok(MockRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
