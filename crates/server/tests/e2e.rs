use std::net::SocketAddr;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::startup::build_state;

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
    config_path: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(dir) = self.config_path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

async fn start_server(initial: serde_json::Value, require_metadata_match: bool) -> anyhow::Result<TestApp> {
    // isolated config blob per test
    let config_path = std::env::temp_dir()
        .join(format!("ill_e2e_{}", Uuid::new_v4()))
        .join("config.json");
    std::fs::create_dir_all(config_path.parent().expect("parent"))?;
    std::fs::write(&config_path, serde_json::to_vec(&initial)?)?;

    let mut cfg = configs::AppConfig::default();
    cfg.storage.config_path = config_path.to_string_lossy().into_owned();
    cfg.service.version = "1.2.3".into();
    cfg.resolver.require_metadata_match = require_metadata_match;

    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, config_path })
}

fn example_config() -> serde_json::Value {
    json!({
        "target_select_1": "5",
        "ill_avail_config_display_branchA_7": "5",
        "ill_avail_config_partners_5": "P9"
    })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server(json!({}), false).await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_services_returns_descriptor() -> anyhow::Result<()> {
    let app = start_server(example_config(), false).await?;
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"ISBN": "", "Title": "War and Peace"}, "ui_context": "branchA"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["enabled"], json!(["P9"]));
    assert_eq!(body["name"], "Z39.50");
    assert_eq!(
        body["endpoint"],
        "/api/v1/contrib/ill_avail_z3950/ill_availability_search_z3950?ui_context=branchA&metadata="
    );
    assert_eq!(body["id"].as_str().map(str::len), Some(64));
    assert_eq!(body["datatablesConfig"]["searching"], false);
    Ok(())
}

#[tokio::test]
async fn e2e_services_not_serviceable_is_false() -> anyhow::Result<()> {
    let app = start_server(example_config(), false).await?;
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"title": "War and Peace"}, "ui_context": "branchB"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?, json!(false));
    Ok(())
}

#[tokio::test]
async fn e2e_services_non_string_context_is_false() -> anyhow::Result<()> {
    let app = start_server(example_config(), false).await?;
    let c = reqwest::Client::new();

    for body in [
        json!({"metadata": {"title": "Emma"}, "ui_context": null}),
        json!({"metadata": {"title": "Emma"}, "ui_context": 7}),
        json!({"metadata": {"title": "Emma"}}),
    ] {
        let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
            .json(&body)
            .send().await?;
        assert_eq!(res.status(), HttpStatusCode::OK);
        assert_eq!(res.json::<serde_json::Value>().await?, json!(false));
    }
    Ok(())
}

#[tokio::test]
async fn e2e_metadata_gate_when_required() -> anyhow::Result<()> {
    let app = start_server(example_config(), true).await?;
    let c = reqwest::Client::new();

    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"publisher": "Penguin"}, "ui_context": "branchA"}))
        .send().await?;
    assert_eq!(res.json::<serde_json::Value>().await?, json!(false));

    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"issn": "0028-0836"}, "ui_context": "branchA"}))
        .send().await?;
    assert!(res.json::<serde_json::Value>().await?.is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_admin_replace_config_swaps_targets() -> anyhow::Result<()> {
    let app = start_server(example_config(), false).await?;
    let c = reqwest::Client::new();

    let res = c.put(format!("{}/admin/config", app.base_url))
        .json(&json!({
            "target_select_1": "8",
            "ill_avail_config_display_branchB_1": "8",
            "ill_avail_z3950_name": "Regional catalogue"
        }))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?["keys"], 3);

    let res = c.get(format!("{}/admin/config", app.base_url)).send().await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["target_select_1"], "8");
    assert!(body.get("ill_avail_config_partners_5").is_none());

    // persisted as the whole blob
    let on_disk: serde_json::Value = serde_json::from_slice(&std::fs::read(&app.config_path)?)?;
    assert_eq!(on_disk, body);

    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"title": "Emma"}, "ui_context": "branchB"}))
        .send().await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["name"], "Regional catalogue");
    assert_eq!(body["enabled"], json!([]));
    Ok(())
}

#[tokio::test]
async fn e2e_admin_reload_reads_file() -> anyhow::Result<()> {
    let app = start_server(json!({}), false).await?;
    let c = reqwest::Client::new();

    std::fs::write(&app.config_path, serde_json::to_vec(&example_config())?)?;
    let res = c.post(format!("{}/admin/config/reload", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"author": "Tolstoy"}, "ui_context": "branchA"}))
        .send().await?;
    assert_eq!(res.json::<serde_json::Value>().await?["enabled"], json!(["P9"]));
    Ok(())
}

#[tokio::test]
async fn e2e_admin_reload_of_corrupt_file_is_500() -> anyhow::Result<()> {
    let app = start_server(example_config(), false).await?;
    let c = reqwest::Client::new();

    std::fs::write(&app.config_path, b"{broken")?;
    let res = c.post(format!("{}/admin/config/reload", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<serde_json::Value>().await?["error"], "Storage Error");

    // previous snapshot still answers
    let res = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {"title": "Emma"}, "ui_context": "branchA"}))
        .send().await?;
    assert!(res.json::<serde_json::Value>().await?.is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_metrics_exposed() -> anyhow::Result<()> {
    let app = start_server(example_config(), false).await?;
    let c = reqwest::Client::new();
    let _ = c.post(format!("{}/api/ill-availability/services", app.base_url))
        .json(&json!({"metadata": {}, "ui_context": "nowhere"}))
        .send().await?;

    let res = c.get(format!("{}/metrics", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("ill_availability_not_serviceable_total"));
    Ok(())
}

#[tokio::test]
async fn startup_fails_on_unreadable_config() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("ill_e2e_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("config.json");
    std::fs::write(&path, b"not json")?;

    let mut cfg = configs::AppConfig::default();
    cfg.storage.config_path = path.to_string_lossy().into_owned();
    assert!(build_state(&cfg).await.is_err());

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}

#[tokio::test]
async fn run_rejects_unparseable_bind_address() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("ill_e2e_{}", Uuid::new_v4()));
    let mut cfg = configs::AppConfig::default();
    cfg.storage.config_path = dir.join("config.json").to_string_lossy().into_owned();
    cfg.server.host = "not a host".into();

    let err = server::run(cfg).await.expect_err("bad address");
    assert!(err.to_string().contains("server address"));

    let _ = std::fs::remove_dir_all(&dir);
    Ok(())
}
