//! Dashboard HTTP server
//!
//! Serves the layout and figure JSON to a plotly front end.
//!
//! Endpoints:
//!   GET /api/health  - Health check
//!   GET /api/layout  - Controls and outputs
//!   GET /api/update?output=<id>&<input-id>=<value>...  - Figure for a selection
//!
//! Every request carries its whole selection, so no per-session state lives
//! here; the tables behind the dashboard are shared read-only.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use crate::logging::{log, log_request, obj, v_str, Domain, Level};
use crate::shell::{Dashboard, Inputs, ShellError};

/// Upper bound on request line plus headers.
pub const MAX_HEAD_BYTES: u64 = 8 * 1024;
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn error(status: u16, msg: &str) -> Self {
        Self::json(status, json!({ "error": msg }).to_string())
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "BAD REQUEST",
            404 => "NOT FOUND",
            405 => "METHOD NOT ALLOWED",
            _ => "INTERNAL SERVER ERROR",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Maps one request to a response. Never panics on bad input.
pub fn route(dashboard: &Dashboard, method: &str, target: &str) -> Response {
    if method != "GET" {
        return Response::error(405, "only GET is supported");
    }
    let url = match Url::parse("http://localhost").and_then(|base| base.join(target)) {
        Ok(url) => url,
        Err(err) => return Response::error(400, &format!("bad target: {}", err)),
    };

    match url.path() {
        "/api/health" => Response::json(200, json!({ "status": "ok" }).to_string()),
        "/api/layout" => match serde_json::to_string(&dashboard.layout()) {
            Ok(body) => Response::json(200, body),
            Err(err) => Response::error(500, &err.to_string()),
        },
        "/api/update" => {
            let mut output = None;
            let mut inputs = Inputs::new();
            for (k, v) in url.query_pairs() {
                if k == "output" {
                    output = Some(v.into_owned());
                } else {
                    inputs.insert(k.into_owned(), v.into_owned());
                }
            }
            let Some(output) = output else {
                return Response::error(400, "missing output parameter");
            };
            match dashboard.update(&output, &inputs) {
                Ok(fig) => Response::json(200, fig.to_json()),
                Err(err @ ShellError::UnknownOutput(_)) => Response::error(404, &err.to_string()),
                Err(err @ ShellError::MissingInput { .. }) => {
                    Response::error(400, &err.to_string())
                }
            }
        }
        _ => Response::error(404, "not found"),
    }
}

pub async fn serve(dashboard: Arc<Dashboard>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, dashboard).await
}

/// Accept loop over an already bound listener.
pub async fn serve_listener(listener: TcpListener, dashboard: Arc<Dashboard>) -> Result<()> {
    log(
        Level::Info,
        Domain::Server,
        "listening",
        obj(&[("addr", v_str(&listener.local_addr()?.to_string()))]),
    );

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Server,
                    "accept_failed",
                    obj(&[("msg", v_str(&err.to_string()))]),
                );
                continue;
            }
        };
        let dashboard = Arc::clone(&dashboard);
        tokio::spawn(async move {
            if let Err(err) = handle(stream, &dashboard).await {
                log(
                    Level::Warn,
                    Domain::Server,
                    "connection_failed",
                    obj(&[("msg", v_str(&err.to_string()))]),
                );
            }
        });
    }
}

async fn handle(stream: TcpStream, dashboard: &Dashboard) -> Result<()> {
    let started = Instant::now();
    let mut reader = BufReader::new(stream.take(MAX_HEAD_BYTES));

    let head = match tokio::time::timeout(READ_TIMEOUT, read_request_line(&mut reader)).await {
        Ok(head) => head?,
        Err(_) => anyhow::bail!("request head not received within {:?}", READ_TIMEOUT),
    };
    let Some(request_line) = head else {
        return Ok(());
    };

    let (method, target, response) = match request_line {
        Ok(line) => {
            let mut parts = line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let target = parts.next().unwrap_or("/").to_string();
            let response = route(dashboard, &method, &target);
            (method, target, response)
        }
        Err(msg) => (String::new(), String::new(), Response::error(400, msg)),
    };

    let mut stream = reader.into_inner().into_inner();
    stream.write_all(response.to_http().as_bytes()).await?;
    stream.shutdown().await?;
    log_request(
        &method,
        &target,
        response.status,
        started.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(())
}

/// Reads the request line and drains the headers; the API has no bodies.
///
/// `None` when the peer closed before sending anything. An inner `Err` means
/// the head was cut off, either by the byte cap or by the peer.
async fn read_request_line<R>(reader: &mut R) -> Result<Option<Result<String, &'static str>>>
where
    R: AsyncBufRead + Unpin,
{
    const INCOMPLETE: &str = "request head too large or incomplete";

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(None);
    }
    if !request_line.ends_with('\n') {
        return Ok(Some(Err(INCOMPLETE)));
    }

    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header).await? == 0 {
            return Ok(Some(Err(INCOMPLETE)));
        }
        if !header.ends_with('\n') {
            return Ok(Some(Err(INCOMPLETE)));
        }
        if header.trim().is_empty() {
            break;
        }
    }
    Ok(Some(Ok(request_line)))
}
