pub mod config;
pub mod engine;
pub mod log;
pub mod lsp;
pub mod rpc;
pub mod workspace;
