//! Common test utilities for hubdeck integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's data or config directories.

#![allow(dead_code)]

use assert_cmd::Command;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;
pub use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// A test environment with isolated data and config directories.
///
/// The `hd()` method returns a `Command` that sets `HD_DATA_DIR` and
/// `HD_CONFIG_DIR` per invocation and clears every other variable hubdeck
/// reads, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the hd binary with isolated directories.
    pub fn hd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_hd"));
        cmd.current_dir(self.data_dir.path());
        cmd.env("HD_DATA_DIR", self.data_dir.path());
        cmd.env("HD_CONFIG_DIR", self.config_dir.path());
        for var in [
            "GITHUB_TOKEN",
            "HD_API_BASE",
            "HD_CACHE_ORIGIN",
            "HD_CACHE_NAME",
            "HD_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Run `hd` with `args`, assert success and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.hd().args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    }

    /// Add a task and return its id.
    pub fn add_task(&self, text: &str, priority: &str) -> String {
        let value = self.json(&["task", "add", text, "-p", priority]);
        value["task"]["id"].as_str().unwrap().to_string()
    }

    pub fn write_config(&self, kdl: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), kdl).unwrap();
    }

    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    pub fn config_path(&self) -> &std::path::Path {
        self.config_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// === Mock HTTP server ===

/// A canned GET response for one path. Query strings are ignored.
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Route {
    pub fn json(path: &str, body: serde_json::Value) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(path: &str, content_type: &'static str, body: &str) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            content_type,
            body: body.to_string(),
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    fn into_mock(self) -> Mock {
        Mock::given(method("GET"))
            .and(path(self.path))
            .respond_with(
                ResponseTemplate::new(self.status).set_body_raw(self.body, self.content_type),
            )
    }
}

/// A wiremock server driven from synchronous tests.
///
/// The server runs on its own thread; the runtime here only drives setup.
/// Unmatched requests get a 404. After [`MockServer::stop`] the port is
/// closed, so requests against `origin` fail at the transport level.
pub struct MockServer {
    pub origin: String,
    address: SocketAddr,
    server: Option<wiremock::MockServer>,
    runtime: Runtime,
}

impl MockServer {
    pub fn start(routes: Vec<Route>) -> Self {
        Self::start_with(move |_| routes)
    }

    /// Build the route table once the origin is known, for bodies that
    /// link back to the server.
    pub fn start_with(build: impl FnOnce(&str) -> Vec<Route>) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        // A dedicated (unpooled) server so dropping it closes the port.
        let server = runtime.block_on(wiremock::MockServer::builder().start());
        let origin = server.uri();
        let address = *server.address();
        runtime.block_on(async {
            for route in build(&origin) {
                route.into_mock().mount(&server).await;
            }
        });

        Self {
            origin,
            address,
            server: Some(server),
            runtime,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// Paths of the requests received so far, in order.
    pub fn requested_paths(&self) -> Vec<String> {
        let Some(ref server) = self.server else {
            return Vec::new();
        };
        self.runtime
            .block_on(server.received_requests())
            .unwrap_or_default()
            .into_iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }

    /// Shut the server down and wait until the port refuses connections.
    pub fn stop(mut self) {
        drop(self.server.take());
        for _ in 0..200 {
            if TcpStream::connect_timeout(&self.address, Duration::from_millis(50)).is_err() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("mock server on {} did not shut down", self.address);
    }
}

/// An origin on a port nothing listens on.
pub fn closed_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
