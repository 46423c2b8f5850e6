use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use study_sheet::models::{AppData, DailyLog, TodayResponse};
use study_sheet::sheet::{generate, set_year_goal};
use tokio::sync::Mutex;
use tokio::time::sleep;

const STUB_REPLY: &str = "よく頑張りました！明日も続けましょう。";

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static GEMINI_STUB: Lazy<String> = Lazy::new(spawn_gemini_stub);

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("study_sheet_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

/// Answers like the Gemini API. Prompts mentioning FAIL get a server error and
/// prompts mentioning EMPTY get a blank answer.
async fn generate_content(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default();
    if prompt.contains("FAIL") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "upstream exploded" })),
        );
    }
    let text = if prompt.contains("EMPTY") {
        "  \n".to_string()
    } else {
        format!("  {STUB_REPLY}\n")
    };
    (
        StatusCode::OK,
        Json(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })),
    )
}

fn spawn_gemini_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub port");
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("stub runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new().route("/v1beta/models/:model", post(generate_content));
            axum::serve(listener, app).await.unwrap();
        });
    });
    format!("http://{addr}")
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/today")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_study_sheet"))
        .env("PORT", port.to_string())
        .env("APP_DATA_DIR", unique_data_dir())
        .env("GEMINI_API_BASE", GEMINI_STUB.as_str())
        .env("GEMINI_API_KEY", "test-key")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn today(client: &Client, server: &TestServer) -> TodayResponse {
    client
        .get(format!("{}/api/today", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn sheet(client: &Client, server: &TestServer) -> Value {
    client
        .get(format!("{}/api/sheet", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_today_has_a_log_on_first_run() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = today(&client, &server).await;
    let log = today.log.expect("today is inside the generated range");
    assert_eq!(log.date, today.date);
    assert!(today.week_id.is_some());
    assert!(today.progress_percent >= 0.0 && today.progress_percent <= 100.0);

    let sheet = sheet(&client, &server).await;
    assert_eq!(sheet["weeklyGoals"].as_array().unwrap().len(), 52);
    assert_eq!(sheet["logs"].as_object().unwrap().len(), 52);
}

#[tokio::test]
async fn http_task_lifecycle_updates_progress() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = today(&client, &server).await.date;

    let mut log: DailyLog = client
        .post(format!("{}/api/logs/{date}/tasks", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let task = log.tasks.last_mut().expect("task added");
    task.content = "reading".to_string();
    task.planned_minutes = 60;
    task.actual_minutes = 30;
    let task_id = task.id.clone();
    log.best_goal = 60;

    let response = client
        .put(format!("{}/api/logs/{date}", server.base_url))
        .json(&log)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let after = today(&client, &server).await;
    assert_eq!(after.log.as_ref().unwrap().best_goal, 60);
    assert!(after.totals.unwrap().actual_minutes >= 30);

    let log: DailyLog = client
        .delete(format!("{}/api/logs/{date}/tasks/{task_id}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(log.tasks.iter().all(|task| task.id != task_id));
}

#[tokio::test]
async fn http_unknown_targets_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/weeks/week53/title", server.base_url))
        .json(&json!({ "title": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/api/logs/1999-01-01/tasks", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/api/logs/not-a-date/tasks", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_week_title_and_summary() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/weeks/week2/title", server.base_url))
        .json(&json!({ "title": "past papers" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let week: Value = client
        .get(format!("{}/api/weeks/week2", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(week["goal"]["id"], "week2");
    assert_eq!(week["goal"]["title"], "past papers");
    assert_eq!(week["days"].as_array().unwrap().len(), 7);
    assert_eq!(week["days"][0]["generating"], false);
}

#[tokio::test]
async fn http_unconfirmed_start_date_change_is_noop() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = sheet(&client, &server).await;

    let response = client
        .put(format!("{}/api/start-date", server.base_url))
        .json(&json!({ "startDate": "2020-01-06", "confirm": false }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(sheet(&client, &server).await, before);
}

#[tokio::test]
async fn http_import_missing_logs_leaves_sheet_untouched() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = sheet(&client, &server).await;

    let mut payload = before.clone();
    payload.as_object_mut().unwrap().remove("logs");
    let response = client
        .post(format!("{}/api/import?confirm=true", server.base_url))
        .body(payload.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(sheet(&client, &server).await, before);
}

#[tokio::test]
async fn http_export_then_import_round_trips() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let start = today(&client, &server).await.date;
    let replacement: AppData = set_year_goal(generate(start), "JLPT N1");
    let imported: AppData = client
        .post(format!("{}/api/import?confirm=true", server.base_url))
        .body(serde_json::to_string(&replacement).unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(imported, replacement);

    let response = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("study-sheet-data-"));
    assert!(disposition.ends_with(".json\""));
    let exported = response.text().await.unwrap();

    let response = client
        .post(format!("{}/api/import?confirm=true", server.base_url))
        .body(exported.clone())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let exported: AppData = serde_json::from_str(&exported).unwrap();
    let current: AppData = serde_json::from_value(sheet(&client, &server).await).unwrap();
    assert_eq!(current, exported);
    assert_eq!(current.year_goal, "JLPT N1");
}

#[tokio::test]
async fn http_coach_comment_is_written_to_the_log() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let mut log = today(&client, &server).await.log.unwrap();
    log.comment = "集中できた".to_string();
    let date = log.date;
    let response = client
        .put(format!("{}/api/logs/{date}", server.base_url))
        .json(&log)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let log: DailyLog = client
        .post(format!("{}/api/logs/{date}/coach", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(log.ai_coach_comment, STUB_REPLY);

    let pending: Vec<String> = client
        .get(format!("{}/api/coach/pending", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn http_coach_failure_becomes_a_message() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let mut log = today(&client, &server).await.log.unwrap();
    log.comment = "FAIL".to_string();

    let response = client
        .put(format!("{}/api/logs/{}", server.base_url, log.date))
        .json(&log)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/api/logs/{}/coach", server.base_url, log.date))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let log: DailyLog = response.json().await.unwrap();
    assert!(log.ai_coach_comment.starts_with("コメントの生成に失敗しました"));
    assert!(log.ai_coach_comment.contains("500"));
    assert_eq!(log.comment, "FAIL");
}

#[tokio::test]
async fn http_blank_coach_answer_clears_the_comment() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let mut log = today(&client, &server).await.log.unwrap();
    log.comment = "EMPTY".to_string();
    log.ai_coach_comment = "old advice".to_string();

    let response = client
        .put(format!("{}/api/logs/{}", server.base_url, log.date))
        .json(&log)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/api/logs/{}/coach", server.base_url, log.date))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let log: DailyLog = response.json().await.unwrap();
    assert_eq!(log.ai_coach_comment, "");
    assert_eq!(log.comment, "EMPTY");
}

#[tokio::test]
async fn http_sidebar_preference_persists() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for open in [false, true] {
        let response = client
            .put(format!("{}/api/sidebar", server.base_url))
            .json(&json!({ "open": open }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());

        let state: Value = client
            .get(format!("{}/api/sidebar", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["open"], open);
    }
}
