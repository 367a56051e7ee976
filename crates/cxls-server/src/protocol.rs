//! JSON-RPC error codes reserved by the protocol for request cancellation.
//!
//! Forwarded opens and closes are notifications, so nothing here cancels
//! anything. The codes exist so other components agree on their values; a
//! [`ForwardError`](crate::ForwardError) that carries one passes it through
//! untouched.

/// The client cancelled a request.
pub const REQUEST_CANCELLED: i64 = -32800;

/// The server cancelled a request.
pub const SERVER_CANCELLED: i64 = -32802;
