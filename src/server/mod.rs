// Server module
// TCP listener and per-connection HTTP/1 serving

mod connection;
mod listener;

pub use connection::serve;
pub use listener::create_listener;
