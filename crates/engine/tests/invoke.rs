use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use wello_engine::agents::AgentGraph;
use wello_engine::api::routes::create_router;
use wello_engine::api::AppState;
use wello_engine::config::Settings;
use wello_engine::llm::Generator;
use wello_engine::memory::Db;

const ROUTE_RESEARCHER: &str = r#"{"next": "researcher", "reason": "Needs facts."}"#;
const ROUTE_CODER: &str = r#"{"next": "coder", "reason": "Needs computation."}"#;
const FINISH: &str = r#"{"next": "FINISH", "reason": "The answer is sufficient."}"#;
const REJECT: &str = r#"{"next": "supervisor", "reason": "Does not answer the question."}"#;

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_settings(api_url: String) -> Settings {
    Settings {
        bind_addr: "127.0.0.1:0".to_string(),
        database_path: PathBuf::from("unused"),
        api_key: "test-key".to_string(),
        api_url,
        model: "test-model".to_string(),
        temperature: 0.0,
        max_tokens: 64,
        input_max_chars: 100,
    }
}

/// Engine wired to the given completions endpoint, on its own port.
async fn start_engine(api_url: String) -> SocketAddr {
    let settings = test_settings(api_url);
    let state = AppState {
        db: Db::open_in_memory().unwrap(),
        graph: Arc::new(AgentGraph::new(Generator::new(&settings))),
        input_max_chars: settings.input_max_chars,
    };
    serve(create_router().with_state(state)).await
}

fn completion_body(content: &str) -> Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

/// Completions endpoint that replays `replies` in order, one per call.
fn scripted(replies: &[&'static str]) -> Router {
    let replies: Vec<&'static str> = replies.to_vec();
    let calls = Arc::new(Mutex::new(0usize));
    Router::new().route(
        "/chat/completions",
        post(move |_: Json<Value>| {
            let replies = replies.clone();
            let calls = calls.clone();
            async move {
                let reply = {
                    let mut n = calls.lock().unwrap();
                    let i = *n;
                    *n += 1;
                    replies.get(i).copied().unwrap_or_default()
                };
                Json(completion_body(reply))
            }
        }),
    )
}

async fn invoke(engine: SocketAddr, message: &str, thread_id: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{}/chat/invoke", engine))
        .json(&json!({ "message": message, "thread_id": thread_id }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let engine = start_engine("http://127.0.0.1:9".to_string()).await;

    let body = reqwest::get(format!("http://{}/", engine))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "Wello engine is running");
}

#[tokio::test]
async fn test_invoke_returns_answer_and_echoes_thread() {
    let stub = serve(scripted(&[ROUTE_RESEARCHER, "Here is your answer.", FINISH])).await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["response"], "Here is your answer.");
    assert_eq!(body["thread_id"], "thread_t1");
}

#[tokio::test]
async fn test_invoke_rejects_empty_message() {
    let engine = start_engine("http://127.0.0.1:9".to_string()).await;

    let res = invoke(engine, "   ", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_invoke_rejects_oversized_message() {
    let engine = start_engine("http://127.0.0.1:9".to_string()).await;

    let res = invoke(engine, &"x".repeat(101), "thread_t1").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invoke_reports_upstream_failure() {
    let stub = serve(Router::new().route(
        "/chat/completions",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": { "message": "boom" } })),
            )
        }),
    ))
    .await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = res.json().await.unwrap();
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_blank_specialist_answer_falls_back() {
    let stub = serve(scripted(&[ROUTE_RESEARCHER, "  ", FINISH])).await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["response"], "Sorry, I couldn't find an answer.");
}

#[tokio::test]
async fn test_immediate_finish_falls_back() {
    let stub = serve(scripted(&[FINISH])).await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["response"], "Sorry, I couldn't find an answer.");
}

#[tokio::test]
async fn test_rejected_answer_gets_another_round() {
    let stub = serve(scripted(&[
        ROUTE_RESEARCHER,
        "It depends.",
        REJECT,
        ROUTE_CODER,
        "The answer is 42.",
        FINISH,
    ]))
    .await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["response"], "The answer is 42.");
}

#[tokio::test]
async fn test_unknown_route_goes_to_the_researcher() {
    let stub = serve(scripted(&[
        r#"{"next": "poet", "reason": "Feels lyrical."}"#,
        "Recovered anyway.",
        FINISH,
    ]))
    .await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["response"], "Recovered anyway.");
}

#[tokio::test]
async fn test_endless_rejection_reports_an_error() {
    // Cycle supervisor, specialist, validator replies with the validator
    // always rejecting, so the run can only end at the round cap.
    let calls = Arc::new(Mutex::new(0usize));
    let recorder = calls.clone();

    let stub = serve(Router::new().route(
        "/chat/completions",
        post(move |_: Json<Value>| {
            let calls = recorder.clone();
            async move {
                let i = {
                    let mut n = calls.lock().unwrap();
                    let i = *n;
                    *n += 1;
                    i
                };
                let reply = match i % 3 {
                    0 => ROUTE_RESEARCHER,
                    1 => "Another unconvincing attempt.",
                    _ => REJECT,
                };
                Json(completion_body(reply))
            }
        }),
    ))
    .await;
    let engine = start_engine(format!("http://{}", stub)).await;

    let res = invoke(engine, "Hello", "thread_t1").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // 8 rounds of supervisor, specialist, validator.
    assert_eq!(*calls.lock().unwrap(), 24);
}

#[tokio::test]
async fn test_history_grows_across_calls() {
    // Record how many messages each completion request carried.
    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let calls = Arc::new(Mutex::new(0usize));

    let replies = [
        ROUTE_RESEARCHER,
        "First answer.",
        FINISH,
        ROUTE_RESEARCHER,
        "Second answer.",
        FINISH,
    ];

    let stub = serve(Router::new().route(
        "/chat/completions",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            let calls = calls.clone();
            async move {
                let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
                recorder.lock().unwrap().push(count);
                let reply = {
                    let mut n = calls.lock().unwrap();
                    let i = *n;
                    *n += 1;
                    replies.get(i).copied().unwrap_or_default()
                };
                Json(completion_body(reply))
            }
        }),
    ))
    .await;
    let engine = start_engine(format!("http://{}", stub)).await;

    invoke(engine, "first question", "thread_t1").await;
    invoke(engine, "second question", "thread_t1").await;

    let seen = seen.lock().unwrap();
    // Supervisor, specialist, validator per call; only the specialist sees
    // the thread, which grows from one message to three.
    assert_eq!(*seen, vec![2, 3, 3, 2, 5, 3]);
}
