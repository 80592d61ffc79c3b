mod common;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{context, initialized_server, initialized_server_with, mock_context, request, tool_output, ALICE};
use open_wearables_domain::testing::{create_mock_health_service, MockHealthService};
use open_wearables_mcp::transport::{create_sse_router, serve, StdioTransport};
use open_wearables_mcp::McpServer;

/// Read from an event stream until one complete SSE event has arrived
async fn next_event<S>(stream: &mut S, buffer: &mut String) -> (String, String)
where
    S: Stream<Item = Result<Bytes, axum::Error>> + Unpin,
{
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let raw: String = buffer.drain(..end + 2).collect();
            let mut event = String::new();
            let mut data = String::new();
            for line in raw.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = value.trim().to_string();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data = value.trim().to_string();
                }
            }
            if event.is_empty() && data.is_empty() {
                // keep-alive comment
                continue;
            }
            return (event, data);
        }

        let chunk = stream.next().await.expect("stream ended").unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_sse_session_round_trip() {
    let (router, state) = create_sse_router(context());

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    assert_eq!(state.session_count(), 1);

    let mut stream = response.into_body().into_data_stream();
    let mut buffer = String::new();

    let (event, endpoint) = next_event(&mut stream, &mut buffer).await;
    assert_eq!(event, "endpoint");
    assert!(endpoint.starts_with("/messages?session_id="));

    let init = request(
        1,
        "initialize",
        json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "sse-test"}}),
    );
    let response = router.clone().oneshot(post(&endpoint, init)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let (event, data) = next_event(&mut stream, &mut buffer).await;
    assert_eq!(event, "message");
    let message: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(message["id"], 1);
    assert_eq!(message["result"]["serverInfo"]["name"], "Open Wearables MCP");

    // Notifications are accepted without producing an event
    let notification = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
    let response = router.clone().oneshot(post(&endpoint, notification)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let call = request(
        2,
        "tools/call",
        json!({"name": "get_user", "arguments": {"user_id": ALICE}}),
    );
    let response = router.clone().oneshot(post(&endpoint, call)).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let (_, data) = next_event(&mut stream, &mut buffer).await;
    let message: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(message["id"], 2);
    assert_eq!(message["result"]["structuredContent"]["email"], "alice@example.com");

    drop(stream);
    assert_eq!(state.session_count(), 0);

    let response = router
        .oneshot(post(&endpoint, request(3, "ping", Value::Null)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sse_sessions_are_independent() {
    let (router, _state) = create_sse_router(context());

    let first = router
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let second = router
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let mut first_stream = first.into_body().into_data_stream();
    let mut second_stream = second.into_body().into_data_stream();
    let mut first_buffer = String::new();
    let mut second_buffer = String::new();
    let (_, first_endpoint) = next_event(&mut first_stream, &mut first_buffer).await;
    let (_, second_endpoint) = next_event(&mut second_stream, &mut second_buffer).await;
    assert_ne!(first_endpoint, second_endpoint);

    let init = request(1, "initialize", json!({"protocolVersion": "2024-11-05", "capabilities": {}}));
    router.clone().oneshot(post(&first_endpoint, init)).await.unwrap();
    next_event(&mut first_stream, &mut first_buffer).await;

    router
        .clone()
        .oneshot(post(&second_endpoint, request(2, "tools/list", json!({}))))
        .await
        .unwrap();
    let (_, data) = next_event(&mut second_stream, &mut second_buffer).await;
    let message: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(message["error"]["code"], -32600);
}

#[tokio::test]
async fn test_sse_rejects_unknown_session_and_bad_body() {
    let (router, state) = create_sse_router(context());

    let unknown = format!("/messages?session_id={}", uuid::Uuid::new_v4());
    let response = router
        .clone()
        .oneshot(post(&unknown, request(1, "ping", Value::Null)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/sse").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut stream = response.into_body().into_data_stream();
    let mut buffer = String::new();
    let (_, endpoint) = next_event(&mut stream, &mut buffer).await;

    let response = router
        .clone()
        .oneshot(post(&endpoint, "{broken".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    state.close_all();
    assert_eq!(state.session_count(), 0);
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_sse_health_endpoint() {
    let (router, _state) = create_sse_router(context());
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["components"]["database"]["status"], "ok");
}

async fn get_health(health: MockHealthService) -> (StatusCode, Value) {
    let (router, _state) = create_sse_router(mock_context(health));
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_sse_health_reflects_database_status() {
    let (status, body) = get_health(create_mock_health_service()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get_health(MockHealthService::new().with_degraded_database()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["database"]["status"], "degraded");
    assert!(body["components"]["database"]["message"].is_string());

    let (status, body) = get_health(MockHealthService::new().with_unhealthy_database()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["components"]["database"]["status"], "error");
}

#[tokio::test]
async fn test_mock_services_answer_like_sqlite() {
    let sqlite = initialized_server().await;
    let mock = initialized_server_with(mock_context(MockHealthService::new())).await;

    let calls = [
        ("list_users", json!({"search": "ALI"})),
        ("get_workouts", json!({"user_id": ALICE, "workout_type": "Running"})),
        ("get_sleep_sessions", json!({"user_id": ALICE, "start_date": "2024-01-11"})),
        (
            "get_steps_data",
            json!({"user_id": ALICE, "start_datetime": "2024-01-10", "end_datetime": "2024-01-12"}),
        ),
        (
            "get_heart_rate_stats",
            json!({"user_id": ALICE, "start_date": "2024-01-01", "end_date": "2024-01-31"}),
        ),
    ];
    for (tool, arguments) in calls {
        let expected = tool_output(&sqlite, tool, arguments.clone()).await;
        let actual = tool_output(&mock, tool, arguments).await;
        assert_eq!(actual, expected, "{}", tool);
    }
}

#[tokio::test]
async fn test_stdio_serve_until_eof() {
    let server = McpServer::new(context());
    let input = [
        request(1, "initialize", json!({"protocolVersion": "2024-11-05", "capabilities": {}})),
        String::new(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        request(2, "tools/call", json!({"name": "list_users", "arguments": {"limit": 1}})),
        "garbage".to_string(),
    ]
    .join("\n")
        + "\n";

    let mut transport = StdioTransport::new(input.as_bytes(), Vec::new());
    serve(&server, &mut transport, std::future::pending()).await.unwrap();

    let (_, written) = transport.into_parts();
    let output = String::from_utf8(written).unwrap();
    let responses: Vec<Value> = output.lines().map(|line| serde_json::from_str(line).unwrap()).collect();

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"]["structuredContent"]["users"].as_array().unwrap().len(), 1);
    assert_eq!(responses[2]["error"]["code"], -32700);
}

#[tokio::test]
async fn test_stdio_serve_stops_on_shutdown() {
    let server = McpServer::new(context());
    let (_client, server_side) = tokio::io::duplex(1024);
    let (reader, writer) = tokio::io::split(server_side);

    let mut transport = StdioTransport::new(tokio::io::BufReader::new(reader), writer);
    serve(&server, &mut transport, async {}).await.unwrap();
}
