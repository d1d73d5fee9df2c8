//! Config file to finished section, against mocked generation and vector services.

use pagecraft::cli::{Commands, RunContext};
use pagecraft::config::ConfigLoader;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATED: &str =
    "Fresh sourdough baked every morning in our wood-fired oven. Visit us downtown.";

fn write_config(dir: &TempDir, server: &MockServer) -> PathBuf {
    let file = dir.path().join("pagecraft.toml");
    std::fs::write(
        &file,
        format!(
            r#"
[providers.writer]
provider_type = "openai"
model = "gpt-4o-mini"
api_key = "test-key"
endpoint = "{uri}"

[generation]
provider = "writer"

[retrieval]
endpoint = "{uri}"
namespaces = ["bakery"]
k = 3
"#,
            uri = server.uri()
        ),
    )
    .unwrap();
    file
}

#[test]
fn explicit_file_parses_every_section() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("pagecraft.toml");
    std::fs::write(
        &file,
        r#"
[providers.local]
provider_type = "local"
model = "mistral"
endpoint = "http://127.0.0.1:8080/v1"

[generation]
provider = "local"
namespaces = ["marketing"]
max_tokens = 800

[generation.rates.local]
input_per_1k = 0.001
output_per_1k = 0.002

[retrieval]
min_score = 0.65

[blocks]
installed = ["kadence"]

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&file).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.generation.max_tokens, 800);
    assert_eq!(config.generation.namespaces, vec!["marketing".to_string()]);
    assert_eq!(config.retrieval.min_score, 0.65);
    assert_eq!(config.retrieval.k, 10);
    assert_eq!(config.logging.format, "json");
    assert_eq!(
        config.generation.rate_table().for_service("local").output_per_1k,
        0.002
    );
}

#[tokio::test]
async fn section_command_runs_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(
            json!({"k": 10, "minScore": 0.5, "namespaces": ["bakery"]}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "text": "Our sourdough is baked every morning in a wood-fired oven downtown.",
                "score": 0.9,
                "sourceId": "kb-oven",
                "title": "Bakery facts"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {"role": "assistant", "content": GENERATED},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 1000, "completion_tokens": 1000, "total_tokens": 2000}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, &server);
    let request_file = dir.path().join("request.json");
    std::fs::write(
        &request_file,
        json!({
            "sectionId": "about-1",
            "contentBrief": "Introduce the bakery and its sourdough",
            "mode": "grounded",
            "blockPreferences": {"preferredFamily": "kadence", "sectionType": "content"},
            "imageRequirements": {"policy": "none"}
        })
        .to_string(),
    )
    .unwrap();

    let context = RunContext::new(dir.path().to_path_buf(), Some(config_file)).unwrap();
    let out = context
        .execute(&Commands::Section {
            request: request_file,
        })
        .await
        .unwrap();

    let section: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(section["sectionId"], "about-1");
    assert_eq!(section["blockType"]["blockName"], "kadence/rowlayout");
    assert_eq!(section["citations"][0]["source"], "kb-oven");
    assert_eq!(section["metadata"]["mode"], "grounded");
    assert_eq!(section["metadata"]["tokenCount"], 2000);
    assert_eq!(section["metadata"]["costUsd"], 0.04);
    assert_eq!(section["metadata"]["cacheHit"], false);
    assert_eq!(context.api().ledger().today(), 0.04);
}

#[tokio::test]
async fn live_outline_failure_still_prints_a_stub_outline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, &server);
    let blueprint_file = dir.path().join("blueprint.json");
    std::fs::write(
        &blueprint_file,
        r#"{"id":"bp-home","sections":[{"heading":"Hero","type":"hero"}]}"#,
    )
    .unwrap();

    let context = RunContext::new(dir.path().to_path_buf(), Some(config_file)).unwrap();
    let out = context
        .execute(&Commands::Outline {
            blueprint: blueprint_file,
            brief: "Homepage for a sourdough bakery".to_string(),
            audience: "neighbors".to_string(),
            tone: "friendly".to_string(),
            stub: false,
        })
        .await
        .unwrap();

    let outline: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(outline["mode"], "stub");
    assert_eq!(outline["estimatedCost"], 0.0);
    assert_eq!(outline["sections"][0]["targetWords"], 300);
}
