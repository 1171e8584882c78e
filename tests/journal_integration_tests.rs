//! End-to-end journaling: client -> running service -> mocked model -> SQLite.

use mockito::{Mock, Server, ServerGuard};
use secrecy::SecretString;
use serde_json::json;
use serenity::ai::MoodGateway;
use serenity::analysis::MentalState;
use serenity::client::AnalysisClient;
use serenity::db::Database;
use serenity::errors::{AIError, AppError};
use serenity::history::load_history;
use serenity::journal::{submit_entry, JournalEntryInput};
use serenity::service::{router, ServiceState};
use serenity::session::{Session, SessionStore};
use tempfile::TempDir;
use tokio::net::TcpListener;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

struct TestEnv {
    _temp_dir: TempDir,
    db: Database,
    session: Session,
    client: AnalysisClient,
}

/// Starts the service on an ephemeral port in front of `upstream`.
async fn spawn_service(upstream: &ServerGuard, api_key: Option<&str>) -> String {
    let gateway = MoodGateway::new(
        format!("{}{}", upstream.url(), COMPLETIONS_PATH),
        "google/gemini-2.5-flash",
        api_key.map(|key| SecretString::from(key.to_string())),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(ServiceState::new(gateway)))
            .await
            .unwrap();
    });

    format!("http://{}/analyze-mood", addr)
}

async fn set_up(upstream: &ServerGuard, api_key: Option<&str>) -> TestEnv {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(&temp_dir.path().join("serenity.db")).unwrap();
    db.initialize_schema().unwrap();

    let store = SessionStore::new(temp_dir.path().join("session.json"));
    let session = store.sign_in(&db, "ada@example.com").unwrap();

    let service_url = spawn_service(upstream, api_key).await;
    TestEnv {
        _temp_dir: temp_dir,
        db,
        session,
        client: AnalysisClient::new(service_url, None),
    }
}

async fn mock_model(server: &mut ServerGuard, score: u32, state: &str) -> Mock {
    let arguments = json!({
        "mood_score": score,
        "mental_state": state,
        "suggestions": [
            "Note three things that went well",
            "Keep tomorrow's plan light",
            "Celebrate with something you enjoy"
        ],
        "habits": [
            "Regular sleep schedule",
            "Daily movement",
            "Evening journaling"
        ],
        "breathing_prompt": "Inhale for four counts, exhale for six, and repeat five times."
    });
    let body = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [{
                    "type": "function",
                    "function": {
                        "name": "analyze_mental_state",
                        "arguments": arguments.to_string()
                    }
                }]
            }
        }]
    });

    server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_productive_day_is_analysed_and_stored() {
    let mut upstream = Server::new_async().await;
    let model = mock_model(&mut upstream, 88, "energized").await;
    let env = set_up(&upstream, Some("test-key")).await;

    let entry = JournalEntryInput::new("I had a wonderful productive day").unwrap();
    let record = submit_entry(&env.db, &env.session, &env.client, &entry)
        .await
        .unwrap();

    assert_eq!(record.entry_text, "I had a wonderful productive day");
    assert_eq!(record.user_id, env.session.user_id);
    assert!(record.analysis.validate().is_ok());
    assert!(record.analysis.mood_score >= 50.0);
    assert!(record.analysis.mental_state.is_positive());
    assert_eq!(record.analysis.mental_state, MentalState::Energized);
    assert!((3..=5).contains(&record.analysis.suggestions.len()));
    assert!((3..=5).contains(&record.analysis.habits.len()));

    let history = load_history(&env.db, &env.session, 7).unwrap();
    assert_eq!(history.entries.len(), 1);
    assert_eq!(history.entries[0], record);
    assert_eq!(history.average_score, Some(88));
    model.assert_async().await;
}

#[tokio::test]
async fn test_failed_analysis_stores_nothing() {
    let upstream = Server::new_async().await;
    let env = set_up(&upstream, None).await;

    let entry = JournalEntryInput::new("Nothing special today").unwrap();
    match submit_entry(&env.db, &env.session, &env.client, &entry).await {
        Err(AppError::AI(AIError::Service(message))) => {
            assert_eq!(message, "SERENITY_AI_API_KEY is not configured")
        }
        other => panic!("Expected Service error, got {:?}", other),
    }

    let history = load_history(&env.db, &env.session, 7).unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_history_shows_most_recent_entries() {
    let mut upstream = Server::new_async().await;
    let _model = mock_model(&mut upstream, 60, "content").await;
    let env = set_up(&upstream, Some("test-key")).await;

    for i in 0..9 {
        let entry = JournalEntryInput::new(format!("Entry number {}", i)).unwrap();
        submit_entry(&env.db, &env.session, &env.client, &entry)
            .await
            .unwrap();
    }

    let history = load_history(&env.db, &env.session, 7).unwrap();
    assert_eq!(history.entries.len(), 7);
    assert_eq!(history.entries[0].entry_text, "Entry number 8");
    assert_eq!(history.entries[6].entry_text, "Entry number 2");
    assert_eq!(history.average_score, Some(60));
}

#[tokio::test]
async fn test_long_entry_is_analysed_and_stored() {
    let mut upstream = Server::new_async().await;
    let model = mock_model(&mut upstream, 72, "calm").await;
    let env = set_up(&upstream, Some("test-key")).await;

    let text = "Long reflective evening. ".repeat(120_000);
    assert!(text.len() > 2 * 1024 * 1024);
    let entry = JournalEntryInput::new(text.clone()).unwrap();
    let record = submit_entry(&env.db, &env.session, &env.client, &entry)
        .await
        .unwrap();

    assert_eq!(record.entry_text, text);
    assert_eq!(record.analysis.mental_state, MentalState::Calm);
    model.assert_async().await;
}

#[test]
fn test_blank_entry_never_builds_a_request() {
    for blank in ["", "   ", "\n\t"] {
        assert!(matches!(
            JournalEntryInput::new(blank),
            Err(AppError::Journal(_))
        ));
    }
}
