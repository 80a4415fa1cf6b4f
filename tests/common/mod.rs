//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use mockroute::config::MockConfig;
use mockroute::lifecycle::bootstrap;
use mockroute::routing::Registry;
use mockroute::state::StateUpdate;
use mockroute::{HttpServer, MockEngine, Shutdown};

/// Definition files of the fixture API, relative to the root.
pub fn fixture_files() -> Vec<(&'static str, Value)> {
    vec![
        ("animals.json", json!([{"name": "toby", "type": "dog"}, {"name": "felix", "type": "cat"}])),
        ("animals/[name].json", json!({"name": "_", "type": "dog", "age": 3})),
        (
            "animals/[name]/friends/[friend_id].json",
            json!({"friend_id": "_", "friends": [{"name": "_", "type": "cat"}]}),
        ),
        ("plants.GET.json", json!([{"name": "rose"}, {"name": "tulip"}])),
        ("comments/*.GET.json", json!([{"text": "first!"}])),
        ("users/*.json", json!([{"id": 1}, {"id": 2}])),
        (
            "users/*.POST.201.json",
            json!({"__body": {"created": true}, "__header": {"x-custom-header": "created", "x-count": "1"}}),
        ),
        ("users/[userid].json", json!({"userid": "_", "name": "Alice"})),
        ("users/[userid].404.{ERR}.json", json!({"error": "user not found"})),
        ("users/[userid].DELETE.json", json!({"__body": {"deleted": true}})),
        (
            "users/[userid].DELETE.404.{ERR}.json",
            json!({"__header": {"x-error": "not-found"}, "__body": {"error": "no such user"}}),
        ),
        (
            "users/[userid].DELETE.401.{INV_CRED|INV_TOKEN}.json",
            json!({"error": "invalid credentials"}),
        ),
    ]
}

/// Write the fixture API into `root`.
pub fn write_fixture(root: &Path) {
    for (path, content) in fixture_files() {
        write_file(root, path, &serde_json::to_string_pretty(&content).unwrap());
    }
    // Empty file: the route answers without a body.
    write_file(root, "users/[userid].PUT.json", "");
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Fixture content of one file.
pub fn fixture(path: &str) -> Value {
    fixture_files()
        .into_iter()
        .find(|(p, _)| *p == path)
        .map(|(_, v)| v)
        .unwrap()
}

/// A running server over a temporary fixture tree.
pub struct TestServer {
    pub addr: SocketAddr,
    pub engine: Arc<MockEngine>,
    pub reload_tx: mpsc::UnboundedSender<Registry>,
    pub dir: TempDir,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn api(&self, path: &str) -> String {
        format!("http://{}/api{}", self.addr, path)
    }

    pub fn admin(&self, path: &str) -> String {
        format!("http://{}/__mock{}", self.addr, path)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server over the fixture API with the given initial states.
pub async fn start_server(states: Vec<StateUpdate>) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut config = MockConfig::default();
    config.api.root_dir = dir.path().to_path_buf();
    config.states = states;

    let engine = bootstrap(&config).unwrap();
    let server = HttpServer::new(&config, Arc::clone(&engine));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, reload_rx, server_shutdown).await;
    });

    TestServer {
        addr,
        engine,
        reload_tx,
        dir,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
