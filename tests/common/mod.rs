#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The full stack needs a reachable Postgres; without DATABASE_URL the
/// integration suites skip rather than fail.
pub fn db_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/pharmacy-api");
        cmd.env("PHARMACY_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique email per test run so suites can re-run against the same database.
pub fn unique_email(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}-{}@test.example", prefix, nanos)
}

/// Register a fresh user and log in; returns (token, user id, email).
pub async fn register_and_login(
    server: &TestServer,
    role: &str,
) -> Result<(String, String, String)> {
    let client = reqwest::Client::new();
    let email = unique_email(role);
    let password = "correct-horse-battery";

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({
            "email": email,
            "password": password,
            "name": format!("Test {}", role),
            "role": role,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );
    let user: Value = res.json().await?;
    let user_id = user["id"].as_str().context("missing user id")?.to_string();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": password, "role": role }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    let token = body["token"].as_str().context("missing token")?.to_string();

    Ok((token, user_id, email))
}

/// Create a medicine owned by the given supplier token; returns its id.
pub async fn create_medicine(
    server: &TestServer,
    supplier_token: &str,
    name: &str,
    price: &str,
    stock: i32,
) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/supplier/medicines", server.base_url))
        .bearer_auth(supplier_token)
        .json(&json!({
            "name": name,
            "description": "test medicine",
            "price": price,
            "stock": stock,
            "manufacturer": "Acme Pharma",
            "category": "analgesic",
            "requiresPrescription": false,
            "expiryDate": "2030-01-01",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create medicine failed: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    Ok(body["id"].as_str().context("missing medicine id")?.to_string())
}
