use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config;
use crate::engine::{AnalysisEngine, EngineFactory};
use crate::lsp::types::{
    CompletionOptions, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    ExecuteCommandOptions, Hover, HoverParams, INCREMENTAL_SYNC, InitializeParams,
    InitializeResult, ServerCapabilities, ServerInfo, SignatureHelpOptions,
};
use crate::rpc::connection::{Connection, Request};
use crate::rpc::message::error_codes;
use crate::workspace::scan::collect_root_files;
use crate::workspace::{
    DocumentStore, Project, ProjectId, ProjectRegistry, TextDocument, uri_to_path,
};

/// Identity reported to the client in every initialize response.
pub const SERVER_NAME: &str = "quickinfo-lsp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Closed,
}

/// Owns the lifecycle state, drains the connection, and routes every
/// inbound message. All project and document mutation happens on this
/// single dispatch loop; that single-writer invariant is what makes the
/// bookkeeping safe without locks.
pub struct Server {
    conn: Connection,
    state: SessionState,
    registry: ProjectRegistry,
    documents: DocumentStore,
    engines: HashMap<ProjectId, Box<dyn AnalysisEngine>>,
    engine_factory: EngineFactory,
    done: Option<oneshot::Sender<()>>,
}

impl Server {
    /// The returned receiver resolves exactly once, when the session
    /// reaches `Closed` (explicit close or remote EOF).
    pub fn new(conn: Connection, engine_factory: EngineFactory) -> (Self, oneshot::Receiver<()>) {
        let (done_tx, done_rx) = oneshot::channel();
        let server = Self {
            conn,
            state: SessionState::Uninitialized,
            registry: ProjectRegistry::new(),
            documents: DocumentStore::new(),
            engines: HashMap::new(),
            engine_factory,
            done: Some(done_tx),
        };
        (server, done_rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drains the connection until the remote end disconnects or a framing
    /// error makes the stream unusable. Handler failures are logged and do
    /// not terminate the loop.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!("server listening");
        let result = self.listen().await;
        self.finish();
        result
    }

    async fn listen(&mut self) -> anyhow::Result<()> {
        while let Some(next) = self.conn.next_request().await {
            match next {
                Ok(req) => {
                    debug!("dispatching {} (request: {})", req.method(), req.is_request());
                    if let Err(e) = self.dispatch(req).await {
                        error!("request handler failed: {:#}", e);
                    }
                }
                Err(e) if e.is_disconnect() => {
                    info!("remote end closed the connection");
                    return Ok(());
                }
                Err(e) => return Err(e).context("connection failed"),
            }
        }
        Ok(())
    }

    /// Explicitly closes the session and the underlying streams.
    pub async fn close(&mut self) -> anyhow::Result<()> {
        if self.state == SessionState::Closed {
            anyhow::bail!("already closed");
        }
        self.finish();
        self.conn.close().await?;
        Ok(())
    }

    fn finish(&mut self) {
        self.state = SessionState::Closed;
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
    }

    async fn dispatch(&mut self, mut req: Request) -> anyhow::Result<()> {
        let method = req.method().to_string();

        // Lifecycle gate: everything but initialize requires a Ready
        // session, and initialize itself must not run twice.
        match (self.state, method.as_str()) {
            (SessionState::Uninitialized, method) if method != "initialize" => {
                warn!("message before initialize: {}", method);
                if req.is_request() {
                    req.respond_error(
                        error_codes::SERVER_NOT_INITIALIZED,
                        "server not initialized",
                        None,
                    )
                    .await?;
                }
                return Ok(());
            }
            (SessionState::Ready, "initialize") => {
                req.respond_error(
                    error_codes::INVALID_REQUEST,
                    "server already initialized",
                    None,
                )
                .await?;
                return Ok(());
            }
            _ => {}
        }

        match method.as_str() {
            "initialize" => self.initialize(req).await,
            "textDocument/hover" => self.hover(req).await,
            "textDocument/didOpen" => self.did_open(req).await,
            "textDocument/didClose" => self.did_close(req).await,
            method => {
                warn!("unknown method: {}", method);
                if req.is_request() {
                    let message = format!("unknown method: {method}");
                    req.respond_error(error_codes::METHOD_NOT_FOUND, message, None)
                        .await?;
                }
                Ok(())
            }
        }
    }

    /// Seeds a project from a non-recursive scan of the root directory,
    /// binds a fresh analysis engine to it, and reports the static
    /// capability table.
    async fn initialize(&mut self, mut req: Request) -> anyhow::Result<()> {
        let params: InitializeParams = parse_params(req.params())?;
        let root_uri = params.root_uri.context("initialize without rootUri")?;
        let root_path = uri_to_path(&root_uri).to_string();
        let root_files = collect_root_files(Path::new(&root_path))
            .with_context(|| format!("scanning workspace root {root_path}"))?;
        info!(
            "registering project {} with {} initial files",
            root_path,
            root_files.len()
        );

        let project = Project::new(root_path, root_files);
        let engine = (self.engine_factory)(&project).context("binding analysis engine")?;
        let project_id = self.registry.register(project);
        self.engines.insert(project_id, engine);
        self.state = SessionState::Ready;

        req.respond(InitializeResult {
            capabilities: server_capabilities(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
        .await?;
        debug!("initialization succeeded");
        Ok(())
    }

    async fn hover(&mut self, mut req: Request) -> anyhow::Result<()> {
        let params: HoverParams = parse_params(req.params())?;
        let uri = &params.text_document.uri;
        let document = self
            .documents
            .get(uri)
            .with_context(|| format!("document not open: {uri}"))?;

        let project_id = self.registry.find_project_by_document(uri)?;
        let project = self
            .registry
            .get(project_id)
            .context("project handle went stale")?;
        let engine = self
            .engines
            .get(&project_id)
            .context("no engine bound to project")?;

        let script_file = project.normalize(document.path());
        let offset = document.offset_at(params.position);
        let quick_info = engine.quick_info_at(project, &script_file, offset)?;
        debug!("quick-info at {}:{}: {:?}", script_file, offset, quick_info);

        let hover = match quick_info {
            Some(info) if !info.display_parts.is_empty() => {
                Hover::typescript(info.display_parts.concat())
            }
            _ => Hover::empty(),
        };
        req.respond(hover).await?;
        Ok(())
    }

    async fn did_open(&mut self, req: Request) -> anyhow::Result<()> {
        let params: DidOpenTextDocumentParams = parse_params(req.params())?;
        let uri = params.text_document.uri.clone();
        if self.documents.is_open(&uri) {
            error!("cannot open already opened document: {}", uri);
            return Ok(());
        }

        let document = TextDocument::new(params.text_document);
        let project_id = self.registry.find_project_by_document(&uri)?;
        let project = self
            .registry
            .get_mut(project_id)
            .context("project handle went stale")?;
        project.add_script_file(document.path());
        self.documents.open(document);
        debug!("document opened: {}", uri);
        Ok(())
    }

    async fn did_close(&mut self, req: Request) -> anyhow::Result<()> {
        let params: DidCloseTextDocumentParams = parse_params(req.params())?;
        let uri = params.text_document.uri;
        // Only the open buffer goes away; the owning project keeps the
        // script file in its tracked set.
        if self.documents.close(&uri) {
            debug!("document closed: {}", uri);
        } else {
            debug!("close for document that was not open: {}", uri);
        }
        Ok(())
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<&Value>) -> anyhow::Result<T> {
    let params = params.cloned().unwrap_or(Value::Null);
    serde_json::from_value(params).context("invalid params")
}

/// Static capability table, advertised unconditionally.
pub fn server_capabilities() -> ServerCapabilities {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    ServerCapabilities {
        text_document_sync: INCREMENTAL_SYNC,
        completion_provider: CompletionOptions {
            trigger_characters: strings(&[".", "\"", "'", "/", "@", "<"]),
            resolve_provider: true,
        },
        code_action_provider: true,
        definition_provider: true,
        document_formatting_provider: true,
        document_range_formatting_provider: true,
        document_highlight_provider: true,
        document_symbol_provider: true,
        execute_command_provider: ExecuteCommandOptions {
            commands: Vec::new(),
        },
        hover_provider: true,
        rename_provider: true,
        references_provider: true,
        signature_help_provider: SignatureHelpOptions {
            trigger_characters: strings(&["(", ",", "<"]),
        },
        workspace_symbol_provider: true,
        implementation_provider: true,
        type_definition_provider: true,
        folding_range_provider: true,
    }
}

/// Binds the server to stdio and runs it to completion. This is the whole
/// process: logging, the periodic log flush, and the dispatch loop.
pub async fn run_server(log_file: Option<PathBuf>) -> anyhow::Result<()> {
    let log = crate::log::init(log_file)?;

    info!("Starting quickinfo-lsp server");

    // Diagnostic output is flushed on a timer independent of the dispatch
    // loop; it touches no request-handling state.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config::LOG_FLUSH_INTERVAL);
        loop {
            interval.tick().await;
            log.flush();
        }
    });

    let conn = Connection::new(tokio::io::stdin(), tokio::io::stdout());
    let (mut server, done) = Server::new(conn, crate::engine::noop_factory());

    let result = tokio::select! {
        result = server.run() => result,
        _ = done => Ok(()),
    };

    info!("quickinfo-lsp server stopped");
    result
}
