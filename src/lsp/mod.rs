// LSP protocol layer
// - types.rs: payload models and the static capability table
// - server.rs: session lifecycle, dispatch loop, request handlers
pub mod server;
pub mod types;
