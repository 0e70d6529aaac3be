//! Reliable byte-exact stream wrapper.
//!
//! A stream socket does not guarantee that one read or write call moves the
//! full requested amount. The protocol's framing (explicit lengths) depends
//! on exact byte counts, so every send and receive here loops until the
//! requested count is transferred. A short transfer is not an error, it only
//! continues the loop; a genuine failure aborts with the failure.
//!
//! There is no timeout and no cancellation on any operation; a silent peer
//! stalls the caller indefinitely.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{Result, TombolaError};

/// A connection wrapping one bidirectional stream.
///
/// Generic over the stream type so tests can drive it through an in-memory
/// duplex channel; production code uses [`TcpConnection`].
pub struct Connection<S> {
    stream: S,
}

/// Connection over a TCP stream.
pub type TcpConnection = Connection<TcpStream>;

/// Dial the authority at `addr` and wrap the resulting stream.
pub async fn connect(addr: &str) -> Result<TcpConnection> {
    let stream = TcpStream::connect(addr).await?;
    Ok(Connection::new(stream))
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wrap an already-connected stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Write every byte of `data`, looping over short writes.
    pub async fn send_all(&mut self, data: &[u8]) -> Result<()> {
        let mut sent = 0;
        while sent < data.len() {
            let n = self.stream.write(&data[sent..]).await?;
            if n == 0 {
                return Err(TombolaError::ConnectionClosed);
            }
            sent += n;
        }
        self.stream.flush().await?;
        Ok(())
    }

    /// Read exactly `n` bytes, looping over short reads.
    ///
    /// End-of-stream before `n` bytes were collected is
    /// [`TombolaError::ConnectionClosed`].
    pub async fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut data = vec![0u8; n];
        let mut received = 0;
        while received < n {
            let read = self.stream.read(&mut data[received..]).await?;
            if read == 0 {
                return Err(TombolaError::ConnectionClosed);
            }
            received += read;
        }
        Ok(data)
    }

    /// Read a single byte (tag or status).
    pub async fn read_byte(&mut self) -> Result<u8> {
        let data = self.read_exact(1).await?;
        Ok(data[0])
    }

    /// Read a u32 Big Endian prefix.
    pub async fn read_u32_be(&mut self) -> Result<u32> {
        let data = self.read_exact(4).await?;
        Ok(u32::from_be_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Shut down the write side and release the stream.
    pub async fn close(mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
