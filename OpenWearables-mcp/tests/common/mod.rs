#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use open_wearables_data::database::{create_database_pool, DatabaseConfig, DatabasePool};
use open_wearables_data::models::event_record::{SleepSession, Workout};
use open_wearables_data::models::timeseries::TimeSeriesSample;
use open_wearables_data::models::user::User;
use open_wearables_data::repository::DatabaseStorage;
use open_wearables_domain::testing::{
    create_mock_event_record_service, create_mock_timeseries_service, create_mock_user_service, MockEventRecordRepository,
    MockHealthService, MockTimeSeriesRepository, MockUserRepository,
};
use open_wearables_mcp::{McpServer, ServerContext};

pub const ALICE: &str = "6f1c1a4e-2b7d-4c1e-9a55-0d3f8e2b1a01";
pub const BOB: &str = "9b2e4c7a-5d1f-4e3a-8c66-1e4a9f3c2b02";

fn user(id: &str, email: &str, first: &str, last: &str, created_at: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        external_user_id: Some(format!("ext-{}", first.to_lowercase())),
        created_at: created_at.to_string(),
    }
}

fn workout(
    workout_type: &str,
    start_time: &str,
    duration_seconds: i64,
    distance_meters: Option<f64>,
    avg_heart_rate_bpm: Option<i64>,
) -> Workout {
    Workout {
        id: Uuid::new_v4().to_string(),
        user_id: ALICE.to_string(),
        workout_type: Some(workout_type.to_string()),
        name: None,
        start_time: start_time.to_string(),
        end_time: None,
        duration_seconds: Some(duration_seconds),
        source_provider: Some("garmin".to_string()),
        source_device: Some("Forerunner 265".to_string()),
        calories_kcal: None,
        distance_meters,
        avg_heart_rate_bpm,
        max_heart_rate_bpm: None,
        elevation_gain_meters: None,
    }
}

fn sleep(start_time: &str, duration_seconds: i64, efficiency: Option<f64>, is_nap: bool) -> SleepSession {
    SleepSession {
        id: Uuid::new_v4().to_string(),
        user_id: ALICE.to_string(),
        start_time: start_time.to_string(),
        end_time: None,
        duration_seconds: Some(duration_seconds),
        efficiency_percent: efficiency,
        is_nap,
        source_provider: Some("oura".to_string()),
        source_device: None,
        deep_seconds: None,
        light_seconds: None,
        rem_seconds: None,
        awake_seconds: None,
    }
}

fn sample(series_type: &str, timestamp: &str, value: f64, unit: &str) -> TimeSeriesSample {
    TimeSeriesSample {
        id: Uuid::new_v4().to_string(),
        user_id: ALICE.to_string(),
        timestamp: timestamp.to_string(),
        series_type: series_type.to_string(),
        value,
        unit: unit.to_string(),
    }
}

/// Two users and a week of records for Alice
pub struct Fixtures {
    pub users: Vec<User>,
    pub workouts: Vec<Workout>,
    pub sleep_sessions: Vec<SleepSession>,
    pub samples: Vec<TimeSeriesSample>,
}

pub fn fixtures() -> Fixtures {
    let mut staged = sleep("2024-01-10T23:00:00.000Z", 28_800, Some(90.0), false);
    staged.deep_seconds = Some(5400);
    staged.light_seconds = Some(14_400);
    staged.rem_seconds = Some(7200);
    staged.awake_seconds = Some(1800);

    let mut data = Fixtures {
        users: vec![
            user(ALICE, "alice@example.com", "Alice", "Smith", "2024-01-01T00:00:00.000Z"),
            user(BOB, "bob@example.com", "Bob", "Jones", "2024-02-01T00:00:00.000Z"),
        ],
        workouts: vec![
            workout("running", "2024-01-10T07:00:00.000Z", 1800, Some(5000.0), Some(150)),
            workout("running", "2024-01-12T07:00:00.000Z", 3600, Some(10000.0), Some(160)),
            workout("cycling", "2024-01-15T17:00:00.000Z", 2700, None, None),
        ],
        sleep_sessions: vec![
            staged,
            sleep("2024-01-11T23:00:00.000Z", 25_200, Some(80.0), false),
            sleep("2024-01-12T13:00:00.000Z", 1800, None, true),
        ],
        samples: vec![
            sample("resting_heart_rate", "2024-01-10T06:00:00.000Z", 55.0, "bpm"),
            sample("heart_rate", "2024-01-10T08:00:00.000Z", 60.0, "bpm"),
            sample("heart_rate", "2024-01-10T09:00:00.000Z", 80.0, "bpm"),
            sample("heart_rate", "2024-01-10T10:00:00.000Z", 100.0, "bpm"),
            sample("steps", "2024-01-10T12:00:00.000Z", 4000.0, "count"),
            sample("steps", "2024-01-10T18:00:00.000Z", 6000.0, "count"),
            sample("steps", "2024-01-11T12:00:00.000Z", 5000.0, "count"),
            sample("energy", "2024-01-10T12:00:00.000Z", 250.5, "kcal"),
        ],
    };

    // Stable ids so separately built fixture sets compare equal
    let ids = (1u128..).map(|n| Uuid::from_u128(n).to_string());
    let records = data
        .workouts
        .iter_mut()
        .map(|w| &mut w.id)
        .chain(data.sleep_sessions.iter_mut().map(|s| &mut s.id))
        .chain(data.samples.iter_mut().map(|s| &mut s.id));
    for (id, stable) in records.zip(ids) {
        *id = stable;
    }

    data
}

/// In-memory SQLite database holding the fixtures
pub fn seeded_pool() -> DatabasePool {
    let pool = create_database_pool(&DatabaseConfig::in_memory()).unwrap();
    let data = fixtures();

    for u in &data.users {
        DatabaseStorage::insert_user(&pool, u).unwrap();
    }
    for w in &data.workouts {
        DatabaseStorage::insert_workout(&pool, w).unwrap();
    }
    for s in &data.sleep_sessions {
        DatabaseStorage::insert_sleep_session(&pool, s).unwrap();
    }
    for s in &data.samples {
        DatabaseStorage::insert_sample(&pool, s).unwrap();
    }

    pool
}

pub fn context() -> Arc<ServerContext> {
    Arc::new(ServerContext::from_pool(seeded_pool()))
}

/// The fixtures behind mock repositories, with the given health service
pub fn mock_context(health: MockHealthService) -> Arc<ServerContext> {
    let data = fixtures();
    Arc::new(ServerContext::new(
        Arc::new(create_mock_user_service(MockUserRepository::with_users(data.users))),
        Arc::new(create_mock_event_record_service(
            MockEventRecordRepository::new()
                .with_workouts(data.workouts)
                .with_sleep_sessions(data.sleep_sessions),
        )),
        Arc::new(create_mock_timeseries_service(MockTimeSeriesRepository::with_samples(
            data.samples,
        ))),
        Arc::new(health),
    ))
}

pub fn request(id: i64, method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string()
}

/// Send a request and return the response as JSON
pub async fn send(server: &McpServer, id: i64, method: &str, params: Value) -> Value {
    let response = server
        .handle_message(&request(id, method, params))
        .await
        .expect("requests always get a response");
    serde_json::to_value(response).unwrap()
}

/// A server over the seeded database that has completed the handshake
pub async fn initialized_server() -> McpServer {
    initialized_server_with(context()).await
}

pub async fn initialized_server_with(ctx: Arc<ServerContext>) -> McpServer {
    let server = McpServer::new(ctx);
    let response = send(
        &server,
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "integration-tests", "version": "1.0"}
        }),
    )
    .await;
    assert!(response.get("error").is_none(), "initialize failed: {}", response);
    server
}

/// Call a tool and return the whole `result` object
pub async fn call_tool(server: &McpServer, name: &str, arguments: Value) -> Value {
    let response = send(server, 1, "tools/call", json!({"name": name, "arguments": arguments})).await;
    assert!(response.get("error").is_none(), "tools/call failed: {}", response);
    response["result"].clone()
}

/// Call a tool that is expected to succeed and return its structured content
pub async fn tool_output(server: &McpServer, name: &str, arguments: Value) -> Value {
    let result = call_tool(server, name, arguments).await;
    assert!(result.get("isError").is_none(), "{} returned an error: {}", name, result);
    result["structuredContent"].clone()
}
