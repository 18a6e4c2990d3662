//! `UnafoldSession` against a local HTTP stub that plays the melting form.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use unatherm_core::RemoteConfig;
use unatherm_remote::{MeltingService, RemoteError, UnafoldSession};

#[derive(Debug, Clone)]
struct Request {
    method: String,
    path: String,
    body: String,
}

type Handler = Arc<dyn Fn(&Request) -> String + Send + Sync>;

struct Stub {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Stub {
    async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, handler, log).await;
                });
            }
        });
        Self { addr, requests }
    }

    fn config(&self) -> RemoteConfig {
        RemoteConfig {
            form_url: format!("http://{}/app/form.php", self.addr),
            page_timeout_secs: 5,
            element_timeout_secs: 1,
            poll_interval_ms: 100,
            ..RemoteConfig::default()
        }
    }

    fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<Request>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = (header_end + content_length).min(buf.len());
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();
    Ok(Some(Request { method, path, body }))
}

async fn serve(
    mut stream: TcpStream,
    handler: Handler,
    log: Arc<Mutex<Vec<Request>>>,
) -> std::io::Result<()> {
    if let Some(request) = read_request(&mut stream).await? {
        let page = handler(&request);
        log.lock().unwrap().push(request);
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            page.len(),
            page
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;
    }
    Ok(())
}

const FORM_PAGE: &str = r#"<html><body>
<form action="run.php" method="post">
  <textarea name="seq" rows="4"></textarea>
  <select name="energy_rules"><option>DNA</option><option>RNA</option></select>
  <input type="submit" value="Submit">
</form>
</body></html>"#;

const RESULTS_PAGE: &str = r#"<html><body>
<table class="results">
  <thead><tr><th>Structure</th><th>Energies</th></tr></thead>
  <tbody>
    <tr><td>1</td><td>&Delta;G = -1.72</td><td>&Delta;H = -62.4</td>
        <td>&Delta;S = -195.7</td><td>T<sub>m</sub> = 45.2 &deg;C</td></tr>
  </tbody>
</table>
</body></html>"#;

const PENDING_PAGE: &str = "<html><body><p>Your job is running.</p></body></html>";

const MAINTENANCE_PAGE: &str = "<html><body><p>Down for maintenance.</p></body></html>";

fn melting_form(request: &Request) -> String {
    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/app/form.php") => FORM_PAGE.to_string(),
        ("POST", "/app/run.php") => RESULTS_PAGE.to_string(),
        _ => PENDING_PAGE.to_string(),
    }
}

#[tokio::test]
async fn test_compute_posts_form_and_parses_results() {
    let stub = Stub::start(Arc::new(melting_form)).await;
    let mut session = UnafoldSession::open(stub.config()).await.unwrap();

    let response = session.compute("ACGTACGT").await.unwrap();
    assert_eq!(
        response.params.as_array(),
        ["-1.72", "-62.4", "-195.7", "45.2"]
    );
    assert!(response.result_text.starts_with("1 ΔG = -1.72"));

    let requests = stub.requests();
    let post = requests
        .iter()
        .find(|r| r.method == "POST")
        .expect("form was submitted");
    assert_eq!(post.path, "/app/run.php");
    assert_eq!(post.body, "seq=ACGTACGT&energy_rules=DNA");
    // open, reset before the row, submit
    assert_eq!(session.request_count(), 3);
    session.close().await;
}

#[tokio::test]
async fn test_results_that_never_render_time_out() {
    let stub = Stub::start(Arc::new(|request: &Request| {
        if request.method == "GET" && request.path == "/app/form.php" {
            FORM_PAGE.to_string()
        } else {
            PENDING_PAGE.to_string()
        }
    }))
    .await;
    let mut session = UnafoldSession::open(stub.config()).await.unwrap();

    let err = session.compute("ACGTACGT").await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(_)), "got {err}");
    assert!(err.to_string().contains("did not render"));

    let polls = stub
        .requests()
        .iter()
        .filter(|r| r.method == "GET" && r.path == "/app/run.php")
        .count();
    assert!(polls >= 1);
    session.close().await;
}

#[tokio::test]
async fn test_form_without_sequence_field_is_missing_element() {
    let served = Arc::new(AtomicUsize::new(0));
    let counter = served.clone();
    let stub = Stub::start(Arc::new(move |_: &Request| {
        // The first page load opens the session; later loads lose the form.
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            FORM_PAGE.to_string()
        } else {
            MAINTENANCE_PAGE.to_string()
        }
    }))
    .await;
    let mut session = UnafoldSession::open(stub.config()).await.unwrap();

    let err = session.compute("ACGTACGT").await.unwrap_err();
    match err {
        RemoteError::MissingElement(msg) => assert!(msg.contains("'seq'")),
        other => panic!("unexpected error: {other}"),
    }
    assert!(stub.requests().iter().all(|r| r.method == "GET"));
    assert!(served.load(Ordering::SeqCst) >= 2);
    session.close().await;
}

#[tokio::test]
async fn test_open_without_form_is_session_error() {
    let stub = Stub::start(Arc::new(|_: &Request| MAINTENANCE_PAGE.to_string())).await;
    match UnafoldSession::open(stub.config()).await {
        Err(RemoteError::Session(msg)) => assert!(msg.contains("Missing element")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("session opened without a form"),
    }
}
