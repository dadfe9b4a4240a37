// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::frame::{Frame, FrameRegistry};
use crate::network::RawFrame;
use crate::{AppError, AppResult};

/// Read-side limits and the codec lookup used by every connection.
#[derive(Debug, Copy, Clone)]
pub struct ConnectionConfig {
    pub read_buffer_size: usize,
    pub max_frame_size: u32,
    pub registry: FrameRegistry,
}

/// A framed connection to a client.
///
/// Wraps the byte stream in a `BufWriter` and keeps a `BytesMut` read
/// buffer that frames are cut from. Frames on one connection are read strictly
/// in order.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    stream: BufWriter<S>,
    buffer: BytesMut,
    write_buffer: BytesMut,
    config: ConnectionConfig,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: ConnectionConfig) -> Connection<S> {
        Connection {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(config.read_buffer_size),
            write_buffer: BytesMut::with_capacity(config.read_buffer_size),
            config,
        }
    }

    /// Reads the next frame.
    ///
    /// Keeps reading from the stream until a whole frame is buffered, then
    /// decodes it through the registry. A format error means the stream can
    /// no longer be trusted and the connection should be closed.
    ///
    /// If the client closes the connection gracefully between frames, `None`
    /// is returned. Closing in the middle of a frame is a transport error.
    pub async fn read_frame(&mut self) -> AppResult<Option<Frame>> {
        loop {
            if let Some(raw) = RawFrame::parse(&mut self.buffer, self.config.max_frame_size)? {
                return self.config.registry.decode(raw.header, raw.payload).map(Some);
            }
            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    // client has closed the connection gracefully
                    Ok(None)
                } else {
                    Err(AppError::Transport(format!(
                        "connection closed with {} bytes of an unfinished frame",
                        self.buffer.len()
                    )))
                };
            }
        }
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> AppResult<()> {
        self.write_buffer.clear();
        frame.encode(&mut self.write_buffer)?;
        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::io::{duplex, AsyncWriteExt};

    use super::*;
    use crate::frame::{DataFrame, PingFrame, UnknownFramePolicy};

    fn config(policy: UnknownFramePolicy) -> ConnectionConfig {
        ConnectionConfig {
            read_buffer_size: 64,
            max_frame_size: 16384,
            registry: FrameRegistry::new(policy),
        }
    }

    #[tokio::test]
    async fn test_unknown_frame_is_skipped_and_stream_stays_aligned() {
        let (mut client, server) = duplex(1024);
        let mut connection = Connection::new(server, config(UnknownFramePolicy::Skip));

        // unknown type 0x0b with a 3 byte body, then a ping
        client
            .write_all(&[0x00, 0x00, 0x03, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x01, 1, 2, 3])
            .await
            .unwrap();
        let mut ping = BytesMut::new();
        Frame::from(PingFrame::new(*b"abcdefgh")).encode(&mut ping).unwrap();
        client.write_all(&ping).await.unwrap();
        drop(client);

        let first = connection.read_frame().await.unwrap().unwrap();
        assert!(matches!(first, Frame::Unknown(_)));
        let second = connection.read_frame().await.unwrap().unwrap();
        assert_eq!(second, Frame::from(PingFrame::new(*b"abcdefgh")));
        assert!(connection.read_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_frame_is_rejected() {
        let (mut client, server) = duplex(1024);
        let mut connection = Connection::new(server, config(UnknownFramePolicy::Reject));
        client
            .write_all(&[0x00, 0x00, 0x00, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x01])
            .await
            .unwrap();
        let result = connection.read_frame().await;
        assert!(matches!(result, Err(AppError::FrameFormat(_))));
    }

    #[tokio::test]
    async fn test_close_mid_frame_is_transport_error() {
        let (mut client, server) = duplex(1024);
        let mut connection = Connection::new(server, config(UnknownFramePolicy::Skip));
        client
            .write_all(&[0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, b'h', b'e'])
            .await
            .unwrap();
        drop(client);
        let result = connection.read_frame().await;
        assert!(matches!(result, Err(AppError::Transport(_))));
    }

    #[tokio::test]
    async fn test_write_then_read_back() {
        let (client, server) = duplex(1024);
        let mut writer = Connection::new(client, config(UnknownFramePolicy::Skip));
        let mut reader = Connection::new(server, config(UnknownFramePolicy::Skip));

        let frame = Frame::from(DataFrame::new(7, Bytes::from_static(b"abc"), true).with_padding(4));
        writer.write_frame(&frame).await.unwrap();
        assert_eq!(reader.read_frame().await.unwrap(), Some(frame));
    }
}
