use kalaconnect::prefs::{PreferenceStore, Preferences};
use kalaconnect::remote::RemoteClient;
use kalaconnect::storage::InMemoryImageStore;

use super::*;

fn offline_app() -> App {
    let config = AppConfig::with_base_url("http://127.0.0.1:9");
    App::new(
        &config,
        Arc::new(RemoteClient::new(&config).unwrap()),
        Arc::new(FileDevices::default()),
        Arc::new(InMemoryImageStore::new()),
        Arc::new(PreferenceStore::in_memory(Preferences::default())),
    )
}

async fn run(app: &App, script: &str) -> Vec<Value> {
    let mut out = Vec::new();
    run_lines(app, script.as_bytes(), &mut out).await.unwrap();
    serde_json::Deserializer::from_slice(&out)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[tokio::test]
async fn failing_lines_report_and_script_continues() {
    let app = offline_app();
    let script = "\
session.sign_in_guest
# comment
studio.teleport
market.calculate_price {not json
market.calculate_price {\"product_name\": \"Shawl\", \"base_price\": 1000, \"tier\": \"national\"}
";
    let outputs = run(&app, script).await;

    assert_eq!(outputs.len(), 4);
    assert_eq!(outputs[0]["command"], "session.sign_in_guest");
    assert_eq!(outputs[1]["command"], "studio.teleport");
    assert!(outputs[1]["error"].as_str().unwrap().contains("studio.teleport"));
    assert!(outputs[2]["error"].is_string());
    assert_eq!(outputs[3]["data"]["quote"]["suggested"], 1800.0);
    assert!(app.current_user().is_some());
}
