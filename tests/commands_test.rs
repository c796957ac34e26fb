//! Host command wiring from settings

use recapitan_core::{
    build_ai_service, AiProvider, Command, CommandManager, ErrorKind, FsVault, Settings,
};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{completion, create_test_vault, fixed_clock, monday_morning};

fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.api_key = "sk-settings".to_string();
    settings.model = "gpt-4o-mini".to_string();
    settings.openai_base_url = format!("{}/v1", server.uri());
    settings.private_marker = "%%".to_string();
    settings
}

#[tokio::test]
async fn test_analyze_note_from_settings() {
    let vault = create_test_vault(&[("Ideas/garden.md", "Plant tomatoes %%and hide the key%% soon")]);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Grow things.")))
        .expect(1)
        .mount(&server)
        .await;

    let settings = settings_for(&server);
    let ai = build_ai_service(&settings).unwrap();
    let commands = CommandManager::new(
        &settings,
        Arc::new(FsVault::new(vault.path())),
        ai,
        Arc::new(fixed_clock(monday_morning())),
    )
    .unwrap();

    let note = commands
        .execute(Command::AnalyzeNote {
            path: "Ideas/garden.md".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(note.path, "Ideas/garden Reflection.md");
    assert_eq!(
        std::fs::read_to_string(vault.path().join("Ideas/garden Reflection.md")).unwrap(),
        "Grow things."
    );

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][1]["content"], "Plant tomatoes  soon");
}

#[test]
fn test_missing_model_fails_before_any_request() {
    let mut settings = Settings::default();
    settings.api_key = "sk-settings".to_string();
    settings.model = String::new();

    let err = build_ai_service(&settings).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    settings.ai_provider = AiProvider::Ollama;
    let err = build_ai_service(&settings).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_empty_private_marker_rejected() {
    let server = MockServer::start().await;
    let mut settings = settings_for(&server);
    settings.private_marker = String::new();
    let ai = build_ai_service(&settings).unwrap();
    let vault = create_test_vault(&[]);

    let result = CommandManager::new(
        &settings,
        Arc::new(FsVault::new(vault.path())),
        ai,
        Arc::new(fixed_clock(monday_morning())),
    );

    assert_eq!(result.err().unwrap().kind(), ErrorKind::Configuration);
}
