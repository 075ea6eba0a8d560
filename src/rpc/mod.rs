// JSON-RPC session layer
// - message.rs: typed message model and reserved error codes
// - codec.rs: Content-Length framed reader/writer
// - connection.rs: inbound request stream over a reader/writer pair
pub mod codec;
pub mod connection;
pub mod message;
