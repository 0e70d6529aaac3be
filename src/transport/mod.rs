//! Transport module - reliable byte-exact I/O over a stream socket.

mod stream;

pub use stream::{connect, Connection, TcpConnection};
