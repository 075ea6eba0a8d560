//! Shared harness for the end-to-end session tests: an in-memory client
//! talking to a spawned server over duplex pipes, plus a scripted engine
//! standing in for the external analyzer.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use quickinfo_lsp::engine::{AnalysisEngine, EngineFactory, QuickInfo, ScriptHost};
use quickinfo_lsp::lsp::server::Server;
use quickinfo_lsp::rpc::codec;
use quickinfo_lsp::rpc::connection::Connection;

/// Engine scripted with canned quick-info answers per (file, offset). Every
/// query also records the host's tracked-file view at that moment.
pub struct ScriptedEngine {
    infos: HashMap<(String, usize), Vec<String>>,
    observed_files: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            infos: HashMap::new(),
            observed_files: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_quick_info(mut self, file: &str, offset: usize, parts: &[&str]) -> Self {
        self.infos.insert(
            (file.to_string(), offset),
            parts.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Tracked-file snapshots taken by the engine, one per query.
    pub fn observed_files(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        self.observed_files.clone()
    }
}

impl AnalysisEngine for ScriptedEngine {
    fn quick_info_at(
        &self,
        host: &dyn ScriptHost,
        script_file: &str,
        offset: usize,
    ) -> anyhow::Result<Option<QuickInfo>> {
        self.observed_files
            .lock()
            .unwrap()
            .push(host.script_files());
        Ok(self
            .infos
            .get(&(script_file.to_string(), offset))
            .map(|parts| QuickInfo {
                display_parts: parts.clone(),
            }))
    }
}

struct SharedEngine(Arc<ScriptedEngine>);

impl AnalysisEngine for SharedEngine {
    fn quick_info_at(
        &self,
        host: &dyn ScriptHost,
        script_file: &str,
        offset: usize,
    ) -> anyhow::Result<Option<QuickInfo>> {
        self.0.quick_info_at(host, script_file, offset)
    }
}

pub fn scripted_factory(engine: Arc<ScriptedEngine>) -> EngineFactory {
    Box::new(move |_host| Ok(Box::new(SharedEngine(engine.clone()))))
}

/// Client half of a server spawned over in-memory pipes.
pub struct TestClient {
    pub writer: DuplexStream,
    pub reader: BufReader<DuplexStream>,
    pub server_task: JoinHandle<anyhow::Result<()>>,
    pub done: oneshot::Receiver<()>,
}

impl TestClient {
    pub fn spawn(factory: EngineFactory) -> Self {
        let (client_out, server_in) = tokio::io::duplex(64 * 1024);
        let (server_out, client_in) = tokio::io::duplex(64 * 1024);
        let conn = Connection::new(server_in, server_out);
        let (mut server, done) = Server::new(conn, factory);
        let server_task = tokio::spawn(async move { server.run().await });
        Self {
            writer: client_out,
            reader: BufReader::new(client_in),
            server_task,
            done,
        }
    }

    /// Frames and sends one message, the way a real client would.
    pub async fn send(&mut self, message: Value) {
        let body = serde_json::to_vec(&message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());
        self.writer.write_all(header.as_bytes()).await.unwrap();
        self.writer.write_all(&body).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Next response frame, decoded.
    pub async fn recv(&mut self) -> Value {
        let body = codec::read_frame(&mut self.reader)
            .await
            .unwrap()
            .expect("server closed the stream");
        serde_json::from_slice(&body).unwrap()
    }

    pub async fn initialize(&mut self, id: i64, root: &Path) -> Value {
        self.send(create_initialize_request(id, &file_uri(root))).await;
        self.recv().await
    }
}

pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

pub fn create_initialize_request(id: i64, root_uri: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "processId": null,
            "rootUri": root_uri,
            "capabilities": {}
        }
    })
}

pub fn create_did_open_notification(uri: &str, text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didOpen",
        "params": {
            "textDocument": {
                "uri": uri,
                "languageId": "typescript",
                "version": 1,
                "text": text
            }
        }
    })
}

pub fn create_did_close_notification(uri: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "textDocument/didClose",
        "params": {
            "textDocument": { "uri": uri }
        }
    })
}

pub fn create_hover_request(id: i64, uri: &str, line: u32, character: u32) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "textDocument/hover",
        "params": {
            "textDocument": { "uri": uri },
            "position": { "line": line, "character": character }
        }
    })
}
