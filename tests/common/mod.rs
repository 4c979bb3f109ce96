//! Shared test infrastructure for integration tests.

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A request captured by [`StubServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// How the stub answers one connection.
enum Reply {
    Respond(u16, String),
    /// Read the request, then hold the socket open without writing anything.
    Stall(Duration),
}

/// One-shot HTTP server that answers each incoming connection with the next
/// canned reply, then stops.
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Answer each connection with the next `(status, body)` pair.
    pub fn serve(responses: Vec<(u16, String)>) -> StubServer {
        StubServer::spawn(
            responses
                .into_iter()
                .map(|(status, body)| Reply::Respond(status, body))
                .collect(),
        )
    }

    /// Accept one connection and never reply; the socket is dropped after
    /// `hold`, which should outlast the client timeout.
    #[allow(dead_code)]
    pub fn stall(hold: Duration) -> StubServer {
        StubServer::spawn(vec![Reply::Stall(hold)])
    }

    fn spawn(replies: Vec<Reply>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let url = format!("http://{}", listener.local_addr().expect("stub addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            for reply in replies {
                let Some(stream) = accept_before_deadline(&listener) else {
                    return;
                };
                if let Some(request) = handle_connection(stream, reply) {
                    recorded.lock().expect("stub lock").push(request);
                }
            }
        });
        StubServer {
            url,
            requests,
            handle: Some(handle),
        }
    }

    /// Wait for every canned reply to be served and return the requests.
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("stub thread");
        }
        self.requests.lock().expect("stub lock").clone()
    }
}

/// Give up after a few seconds so a test whose client never connects fails
/// instead of hanging in `finish`.
fn accept_before_deadline(listener: &TcpListener) -> Option<TcpStream> {
    let deadline = Instant::now() + Duration::from_secs(5);
    listener.set_nonblocking(true).ok()?;
    while Instant::now() < deadline {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).ok()?;
                return Some(stream);
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(_) => return None,
        }
    }
    None
}

fn handle_connection(stream: TcpStream, reply: Reply) -> Option<RecordedRequest> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let request = read_request(&mut reader)?;

    let (status, body) = match reply {
        Reply::Respond(status, body) => (status, body),
        Reply::Stall(hold) => {
            std::thread::sleep(hold);
            return Some(request);
        }
    };

    let mut stream = stream;
    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason_phrase(status),
        body.len()
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()?;
    Some(request)
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<RecordedRequest> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let find = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    };
    let body = if let Some(length) = find("content-length") {
        let length: usize = length.parse().ok()?;
        let mut buf = vec![0u8; length];
        reader.read_exact(&mut buf).ok()?;
        String::from_utf8_lossy(&buf).into_owned()
    } else if find("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        read_chunked(reader)?
    } else {
        String::new()
    };

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn read_chunked(reader: &mut BufReader<TcpStream>) -> Option<String> {
    let mut out = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).ok()?;
        let size = usize::from_str_radix(size_line.trim().split(';').next()?, 16).ok()?;
        if size == 0 {
            let mut trailer = String::new();
            reader.read_line(&mut trailer).ok()?;
            break;
        }
        let mut chunk = vec![0u8; size + 2];
        reader.read_exact(&mut chunk).ok()?;
        chunk.truncate(size);
        out.extend_from_slice(&chunk);
    }
    Some(String::from_utf8_lossy(&out).into_owned())
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Base URL nothing listens on; connections are refused immediately.
#[allow(dead_code)]
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";
