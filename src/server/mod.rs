//! QA server - JSON-RPC front end over the check engine
//!
//! A host sends one request per line and reads one response per line.
//!
//! # Module Structure
//! - `protocol` - JSON-RPC request/response types and error codes
//! - `state` - Loaded project and active configuration
//! - `handlers` - Request handlers organized by functionality

pub mod handlers;
pub mod protocol;
pub mod state;

pub use handlers::dispatch;
pub use protocol::{error_codes, ErrorResponse, Request, Response};
pub use state::ServerState;
