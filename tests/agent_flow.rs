//! End-to-end tests for the coding agent over real HTTP.
//!
//! Each test starts a one-shot chat-completion server on localhost, points a
//! DeepSeek provider at it and checks what the agent returns.

use codeweaver::agents::{AgentError, CodingAgent, CodingTask, DEFAULT_FALLBACK_CODE};
use codeweaver::llm::{build_provider, ProviderConfig, ProviderKind};
use codeweaver::LlmError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen by the mock server.
struct CapturedRequest {
    head: String,
    body: serde_json::Value,
}

/// Serve exactly one HTTP response, returning the base URL and the captured request.
async fn serve_once(status: u16, body: String) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local port");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.expect("read request");
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.expect("read body");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let reason = match status {
            200 => "OK",
            429 => "Too Many Requests",
            _ => "Internal Server Error",
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        socket.shutdown().await.ok();

        let body = serde_json::from_slice(&buf[header_end..header_end + content_length])
            .expect("request body is JSON");
        CapturedRequest { head, body }
    });

    (format!("http://{}", addr), handle)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "deepseek-chat",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52}
    })
    .to_string()
}

fn agent_for(base_url: &str) -> CodingAgent {
    let config = ProviderConfig::new(ProviderKind::DeepSeek, "test_key").with_base_url(base_url);
    let provider = build_provider(&config).expect("provider should build");
    CodingAgent::with_defaults(provider)
}

#[tokio::test]
async fn test_generate_returns_exact_model_code() {
    let (base_url, server) = serve_once(200, completion_body("def add(a,b):\n    return a+b")).await;
    let agent = agent_for(&base_url);

    let task = CodingTask::new("Write a function that adds two numbers");
    let code = agent.generate(&task).await;

    assert_eq!(code, "def add(a,b):\n    return a+b");

    let request = server.await.expect("server task");
    assert!(request.head.starts_with("POST /chat/completions"));
    assert!(request
        .head
        .to_lowercase()
        .contains("authorization: bearer test_key"));
    assert_eq!(request.body["model"], "deepseek-chat");
    assert_eq!(request.body["temperature"], 0.7);
    assert_eq!(request.body["max_tokens"], 1000);
    assert_eq!(request.body["stream"], false);
    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][1]["role"], "user");
    assert!(request.body["messages"][1]["content"]
        .as_str()
        .unwrap_or_default()
        .contains("Write a function that adds two numbers"));
}

#[tokio::test]
async fn test_decorated_response_is_cleaned() {
    let (base_url, server) = serve_once(
        200,
        completion_body("\x1b[35m> Code:\ndef f():\n    pass\n2024-01-01 INFO - done"),
    )
    .await;
    let agent = agent_for(&base_url);

    let code = agent.generate(&CodingTask::new("Write f")).await;
    assert_eq!(code, "def f():\n    pass");
    server.await.expect("server task");
}

#[tokio::test]
async fn test_server_error_yields_fallback() {
    let (base_url, server) = serve_once(500, "upstream exploded".to_string()).await;
    let agent = agent_for(&base_url);

    let code = agent.generate(&CodingTask::new("Write a function")).await;
    assert_eq!(code, DEFAULT_FALLBACK_CODE);
    server.await.expect("server task");
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let body = serde_json::json!({"error": {"message": "slow down", "type": "rate_limit"}}).to_string();
    let (base_url, server) = serve_once(429, body).await;
    let agent = agent_for(&base_url);

    let result = agent.try_generate(&CodingTask::new("Write a function")).await;
    assert!(matches!(
        result,
        Err(AgentError::Llm(LlmError::RateLimited(ref msg))) if msg == "slow down"
    ));
    server.await.expect("server task");
}

#[tokio::test]
async fn test_empty_completion_yields_fallback() {
    let (base_url, server) = serve_once(200, completion_body("")).await;
    let agent = agent_for(&base_url);

    let code = agent.generate(&CodingTask::new("Write a function")).await;
    assert_eq!(code, DEFAULT_FALLBACK_CODE);
    server.await.expect("server task");
}

#[tokio::test]
async fn test_blank_task_makes_no_request() {
    // Nothing listens here; a request would surface as RequestFailed.
    let agent = agent_for("http://127.0.0.1:9");

    for description in ["", "   ", "\n"] {
        let task = CodingTask::new(description);
        assert_eq!(agent.generate(&task).await, DEFAULT_FALLBACK_CODE);
        assert!(matches!(
            agent.try_generate(&task).await,
            Err(AgentError::InvalidTask(_))
        ));
    }
}

#[tokio::test]
async fn test_concurrent_invocations_are_independent() {
    let (url_a, server_a) = serve_once(200, completion_body("def a():\n    return 1")).await;
    let (url_b, server_b) = serve_once(200, completion_body("def b():\n    return 2")).await;

    let agent_a = agent_for(&url_a);
    let agent_b = agent_for(&url_b);
    let task_a = CodingTask::new("task a");
    let task_b = CodingTask::new("task b");

    let (code_a, code_b) = tokio::join!(agent_a.generate(&task_a), agent_b.generate(&task_b));

    assert_eq!(code_a, "def a():\n    return 1");
    assert_eq!(code_b, "def b():\n    return 2");
    server_a.await.expect("server a");
    server_b.await.expect("server b");
}
