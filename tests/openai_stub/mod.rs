use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct OpenAiStubConfig {
    /// Requests answered with HTTP 500 before the stub starts succeeding.
    pub failures_before_success: usize,
    pub expected_model: Option<String>,
}

pub struct OpenAiStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl OpenAiStub {
    pub fn spawn(config: OpenAiStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start openai stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/v1");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let mut remaining_failures = config.failures_before_success;
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                if request.method() != &tiny_http::Method::Post || path != "/v1/responses" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                if remaining_failures > 0 {
                    remaining_failures -= 1;
                    let _ = request.respond(
                        tiny_http::Response::from_string(
                            r#"{"error":{"message":"stub overloaded"}}"#,
                        )
                        .with_status_code(500),
                    );
                    continue;
                }

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }

                let parsed: Value = match serde_json::from_str(&body) {
                    Ok(value) => value,
                    Err(_) => {
                        let _ = request.respond(
                            tiny_http::Response::from_string("invalid json").with_status_code(400),
                        );
                        continue;
                    }
                };

                if let Some(expected) = config.expected_model.as_deref() {
                    let actual = parsed.get("model").and_then(|v| v.as_str()).unwrap_or("");
                    if actual != expected {
                        let _ = request.respond(
                            tiny_http::Response::from_string(format!(
                                "unexpected model: expected={expected} actual={actual}"
                            ))
                            .with_status_code(400),
                        );
                        continue;
                    }
                }

                let Some(input) = parsed.get("input").and_then(|v| v.as_str()) else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("missing input").with_status_code(400),
                    );
                    continue;
                };

                let Some(analysis) =
                    extract_between(input, "BEGIN_SITE_ANALYSIS\n", "END_SITE_ANALYSIS")
                else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("missing site analysis markers")
                            .with_status_code(400),
                    );
                    continue;
                };

                let output_text = report_response(analysis);
                let response_body = serde_json::json!({
                    "id": "resp_stub",
                    "object": "response",
                    "model": parsed.get("model").cloned().unwrap_or(Value::String("stub-model".to_owned())),
                    "output": [
                        {
                            "type": "message",
                            "role": "assistant",
                            "content": [
                                { "type": "output_text", "text": output_text }
                            ]
                        }
                    ],
                });

                let mut response = tiny_http::Response::from_string(response_body.to_string())
                    .with_status_code(200);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                response = response.with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for OpenAiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn extract_between<'a>(text: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    let start = text.find(begin)? + begin.len();
    let rest = &text[start..];
    let end_rel = rest.find(end)?;
    Some(&rest[..end_rel])
}

fn report_response(analysis: &str) -> String {
    let url = analysis
        .lines()
        .find_map(|line| line.strip_prefix("URL: "))
        .unwrap_or("the site");
    format!(
        "# Stub Report: {url}\n\
\n\
## Overview\n\
The stub found a few critical issues worth fixing.\n\
\n\
## Recommendations\n\
- Compress hero images before upload\n\
- Serve static assets from a green host\n\
\n\
In summary, {url} can cut its footprint with small changes.\n"
    )
}
