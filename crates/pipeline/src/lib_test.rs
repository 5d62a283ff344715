use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};

use pulse_api::{Client, ClientOptions};
use pulse_config::BackoffState;
use pulse_heartbeat::{Heartbeat, Outcome, STATUS_DEFERRED};
use pulse_offline::Queue;

use super::stages::*;
use super::*;

const TEST_API_KEY: &str = "00000000-0000-4000-8000-000000000000";

fn heartbeat(entity: &str) -> Heartbeat {
    Heartbeat {
        entity: entity.to_string(),
        time: 1585598059.1,
        user_agent: "wakatime/0.1.0 (linux-5.0-x86_64) rust/1.82 plugin/0.0.1".to_string(),
        ..Default::default()
    }
}

struct RecordingStage {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(StageOutput::Forward(heartbeats))
    }
}

struct DroppingStage;

#[async_trait::async_trait]
impl Stage for DroppingStage {
    fn name(&self) -> &'static str {
        "dropping"
    }

    async fn process(&mut self, _heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        Ok(StageOutput::Forward(Vec::new()))
    }
}

struct TerminalStage;

#[async_trait::async_trait]
impl Stage for TerminalStage {
    fn name(&self) -> &'static str {
        "terminal"
    }

    async fn process(&mut self, heartbeats: Vec<Heartbeat>) -> Result<StageOutput> {
        Ok(StageOutput::Done(
            heartbeats
                .into_iter()
                .map(|h| Outcome {
                    status: 201,
                    heartbeat: Some(h),
                    ..Default::default()
                })
                .collect(),
        ))
    }
}

#[tokio::test]
async fn empty_input_skips_all_stages() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pipeline = Pipeline::new(vec![Box::new(RecordingStage {
        calls: calls.clone(),
    })]);

    let outcomes = pipeline.run(Vec::new()).await.unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn emptied_batch_short_circuits_downstream() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pipeline = Pipeline::new(vec![
        Box::new(DroppingStage),
        Box::new(RecordingStage {
            calls: calls.clone(),
        }),
    ]);

    let outcomes = pipeline.run(vec![heartbeat("a.go")]).await.unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn done_terminates_the_chain() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pipeline = Pipeline::new(vec![
        Box::new(TerminalStage),
        Box::new(RecordingStage {
            calls: calls.clone(),
        }),
    ]);

    let outcomes = pipeline.run(vec![heartbeat("a.go")]).await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, 201);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn backoff_guard_defers_to_queue() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));

    let state = BackoffState::default().after_failure(Utc::now());
    let mut pipeline = Pipeline::new(vec![Box::new(BackoffGuard::new(
        state,
        Some(queue.clone()),
    ))]);

    let outcomes = pipeline
        .run(vec![heartbeat("a.go"), heartbeat("b.go")])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == STATUS_DEFERRED));
    assert_eq!(queue.count().unwrap(), 2);
}

#[tokio::test]
async fn inactive_backoff_forwards() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));

    let mut guard = BackoffGuard::new(BackoffState::default(), Some(queue.clone()));
    let output = guard.process(vec![heartbeat("a.go")]).await.unwrap();

    assert!(matches!(output, StageOutput::Forward(batch) if batch.len() == 1));
    assert_eq!(queue.count().unwrap(), 0);
}

#[tokio::test]
async fn drain_prepends_queued_heartbeats() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));
    queue
        .push_many(vec![heartbeat("old1.go"), heartbeat("old2.go")])
        .unwrap();

    let mut drain = OfflineDrain::new(Some(queue.clone()), 1000);
    let output = drain.process(vec![heartbeat("new.go")]).await.unwrap();

    let StageOutput::Forward(batch) = output else {
        panic!("drain must forward");
    };

    let entities: Vec<_> = batch.iter().map(|h| h.entity.as_str()).collect();
    assert_eq!(entities, vec!["old1.go", "old2.go", "new.go"]);
    assert_eq!(queue.count().unwrap(), 0);
}

#[tokio::test]
async fn drain_respects_sync_max() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));
    queue
        .push_many((0..5).map(|i| heartbeat(&format!("old{i}.go"))).collect())
        .unwrap();

    let mut drain = OfflineDrain::new(Some(queue.clone()), 2);
    let output = drain.process(vec![heartbeat("new.go")]).await.unwrap();

    let StageOutput::Forward(batch) = output else {
        panic!("drain must forward");
    };

    assert_eq!(batch.len(), 3);
    assert_eq!(queue.count().unwrap(), 3);
}

#[tokio::test]
async fn drain_disabled_at_zero() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));
    queue.push_many(vec![heartbeat("old.go")]).unwrap();

    let mut drain = OfflineDrain::new(Some(queue.clone()), 0);
    let output = drain.process(vec![heartbeat("new.go")]).await.unwrap();

    let StageOutput::Forward(batch) = output else {
        panic!("drain must forward");
    };

    assert_eq!(batch.len(), 1);
    assert_eq!(queue.count().unwrap(), 1);
}

#[tokio::test]
async fn user_agent_stamp_fills_only_empty() {
    let mut stamp = UserAgentStamp::new("wakatime/0.1.0 (linux-5.0-x86_64) rust/1.82 test");

    let mut custom = heartbeat("a.go");
    custom.user_agent = "custom-agent".to_string();
    let mut blank = heartbeat("b.go");
    blank.user_agent = String::new();

    let output = stamp.process(vec![custom, blank]).await.unwrap();
    let StageOutput::Forward(batch) = output else {
        panic!("stamp must forward");
    };

    assert_eq!(batch[0].user_agent, "custom-agent");
    assert!(batch[1].user_agent.starts_with("wakatime/"));
}

/// Mock bulk endpoint answering each item with the given status.
async fn start_mock(item_status: u16, http_status: u16) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_handler = calls.clone();

    let handler = move |body: String| {
        let calls = calls_handler.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);

            let items: Vec<Value> = serde_json::from_str(&body).unwrap_or_default();
            let responses: Vec<Value> = items
                .into_iter()
                .map(|item| json!([{ "data": item }, item_status]))
                .collect();

            (
                StatusCode::from_u16(http_status).unwrap(),
                json!({ "responses": responses }).to_string(),
            )
                .into_response()
        }
    };

    let app = Router::new().route("/users/current/heartbeats.bulk", post(handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, calls)
}

fn test_client(base_url: &str) -> Client {
    Client::new(ClientOptions {
        base_url: base_url.to_string(),
        api_key: TEST_API_KEY.to_string(),
        user_agent: pulse_heartbeat::user_agent(Some("plugin/0.0.1")),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn sink_returns_outcomes_on_success() {
    let (base_url, _) = start_mock(201, 201).await;
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));

    let mut sink = ApiSink::new(
        test_client(&base_url),
        Some(queue.clone()),
        BackoffState::default(),
        None,
    );

    let output = sink
        .process(vec![heartbeat("a.go"), heartbeat("b.go")])
        .await
        .unwrap();

    let StageOutput::Done(outcomes) = output else {
        panic!("sink must terminate");
    };

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_accepted()));
    assert_eq!(queue.count().unwrap(), 0);
}

#[tokio::test]
async fn sink_requeues_batch_on_server_error() {
    let (base_url, _) = start_mock(201, 500).await;
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));
    let config_path = dir.path().join("config.toml");

    let mut sink = ApiSink::new(
        test_client(&base_url),
        Some(queue.clone()),
        BackoffState::default(),
        Some(config_path.clone()),
    );

    let output = sink.process(vec![heartbeat("a.go")]).await.unwrap();

    let StageOutput::Done(outcomes) = output else {
        panic!("sink must terminate");
    };

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, STATUS_DEFERRED);
    assert_eq!(queue.count().unwrap(), 1);

    // backoff state was persisted
    let mut view = pulse_config::ConfigView::new();
    view.merge_table(pulse_config::load_file(&config_path).unwrap());
    let state = BackoffState::from_config(&view);
    assert_eq!(state.retries, 1);
    assert!(state.at.is_some());
}

#[tokio::test]
async fn sink_requeues_individually_rejected_heartbeats() {
    let (base_url, _) = start_mock(500, 201).await;
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));

    let mut sink = ApiSink::new(
        test_client(&base_url),
        Some(queue.clone()),
        BackoffState::default(),
        None,
    );

    let output = sink
        .process(vec![heartbeat("a.go"), heartbeat("b.go")])
        .await
        .unwrap();

    let StageOutput::Done(outcomes) = output else {
        panic!("sink must terminate");
    };

    assert_eq!(outcomes.len(), 2);
    assert_eq!(queue.count().unwrap(), 2);
}

#[tokio::test]
async fn sink_surfaces_auth_error_without_queueing() {
    let (base_url, _) = start_mock(201, 401).await;
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join("queue.db"));

    let mut sink = ApiSink::new(
        test_client(&base_url),
        Some(queue.clone()),
        BackoffState::default(),
        None,
    );

    let err = sink.process(vec![heartbeat("a.go")]).await.unwrap_err();

    assert!(matches!(err, PipelineError::Api(pulse_api::ApiError::Auth(_))));
    assert_eq!(queue.count().unwrap(), 0);
}

#[tokio::test]
async fn sink_clears_persisted_backoff_on_success() {
    let (base_url, _) = start_mock(201, 201).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let previous = BackoffState::default().after_failure(Utc::now() - chrono::Duration::hours(1));
    previous.save(&config_path).unwrap();

    let mut sink = ApiSink::new(
        test_client(&base_url),
        None,
        previous,
        Some(config_path.clone()),
    );

    sink.process(vec![heartbeat("a.go")]).await.unwrap();

    let table = pulse_config::load_file(&config_path).unwrap();
    assert!(!table.contains_key("internal"));
}
