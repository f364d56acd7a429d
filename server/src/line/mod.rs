//! Line-oriented transport: TCP accept loop, per-connection framing, and
//! rendering of engine events to text lines.

pub mod connection;
pub mod formatter;
pub mod listener;
