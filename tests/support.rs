use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::Path;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// How the fake backend answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Logins succeed and every call returns `SUCCESS`.
    Healthy,
    /// Logins succeed, every other call fails with a 500.
    Failing,
    /// Every login is rejected.
    RejectLogins,
}

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
    requests: Arc<AtomicU64>,
}

impl ServerHandle {
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Spawns a backend speaking just enough of the loop REST API.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_backend(mode: Backend) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let requests = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&requests);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let counter = Arc::clone(&counter);
                    thread::spawn(move || handle_client(stream, mode, &counter));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
            requests,
        },
    ))
}

fn handle_client(stream: TcpStream, mode: Backend, counter: &AtomicU64) {
    if stream.set_nonblocking(false).is_err() {
        return;
    }
    let Ok(reader_stream) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(reader_stream);
    let mut writer = stream;

    // Keep-alive: serve requests until the client hangs up.
    loop {
        let mut request_line = String::new();
        match reader.read_line(&mut request_line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).is_err() {
                return;
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }
        counter.fetch_add(1, Ordering::SeqCst);

        let (status, payload) = respond(&request_line, mode);
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            status,
            payload.len(),
            payload
        );
        if writer.write_all(response.as_bytes()).is_err() || writer.flush().is_err() {
            break;
        }
    }
    drop(writer.shutdown(Shutdown::Both));
}

fn respond(request_line: &str, mode: Backend) -> (&'static str, &'static str) {
    let is_login = request_line.starts_with("POST ") && request_line.contains("/auth/login");
    match (mode, is_login) {
        (Backend::RejectLogins, true) => ("200 OK", r#"{"returnCode":"USER_NOT_FOUND"}"#),
        (Backend::Healthy | Backend::Failing, true) => (
            "200 OK",
            r#"{"returnCode":"SUCCESS","data":{"accessToken":"e2e-token"}}"#,
        ),
        (Backend::Failing, false) => (
            "500 Internal Server Error",
            r#"{"returnCode":"INTERNAL_SERVER_ERROR"}"#,
        ),
        (Backend::Healthy | Backend::RejectLogins, false) => ("200 OK", r#"{"returnCode":"SUCCESS"}"#),
    }
}

/// Runs the `loopload` binary from `dir` and captures its output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_loopload<I, S>(dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = loopload_bin()?;
    Command::new(bin)
        .current_dir(dir)
        .args(args)
        .env_remove("BASE_URL")
        .env_remove("RUST_LOG")
        .env("LOOPLOAD_LOG", "error")
        .output()
        .map_err(|err| format!("run loopload failed: {}", err))
}

fn loopload_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_loopload").map_or_else(
        || Err("CARGO_BIN_EXE_loopload missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}

pub fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
