#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

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

        // Memory backend keeps the suite independent of a running Postgres
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_motion-workspace"));
        cmd.arg("serve")
            .env("PORT", port.to_string())
            .env("DATABASE_BACKEND", "memory")
            .env("SECURITY_JWT_SECRET", "")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

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
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Create a workspace owned by `owner` and return its id
pub async fn create_workspace(server: &TestServer, name: &str, owner: &str) -> Result<String> {
    let res = reqwest::Client::new()
        .post(server.url("/workspaces"))
        .json(&json!({ "name": name, "owner_id": owner }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "create workspace: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["id"]
        .as_str()
        .map(String::from)
        .context("workspace id missing from response")
}

/// Create an invite and return its id
pub async fn create_invite(
    server: &TestServer,
    workspace_id: &str,
    invited_by: &str,
    identifier: &str,
    access_type: &str,
) -> Result<String> {
    let res = reqwest::Client::new()
        .post(server.url(&format!("/workspaces/{}/invites", workspace_id)))
        .json(&json!({
            "invited_by": invited_by,
            "identifier": identifier,
            "access_type": access_type
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "create invite: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["id"]
        .as_str()
        .map(String::from)
        .context("invite id missing from response")
}
