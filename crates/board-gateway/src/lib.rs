//! WebSocket event gateway: fans out transaction and message events to
//! connected clients.

pub mod connection;
pub mod dispatcher;
