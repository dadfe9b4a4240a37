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

use std::future::Future;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, trace};

use super::{FrameHandler, Request, RequestHandler};
use crate::frame::Frame;
use crate::network::{Connection, ConnectionConfig};
use crate::{AppResult, Shutdown};

/// Frame loop of one dispatched connection.
pub struct FrameSession<H, S = TcpStream> {
    connection_id: u64,
    connection: Connection<S>,
    frame_handler: Arc<H>,
    shutdown: Shutdown,
    _shutdown_complete_tx: mpsc::Sender<()>,
}

impl<H, S> FrameSession<H, S>
where
    H: FrameHandler,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(
        connection_id: u64,
        connection: Connection<S>,
        frame_handler: Arc<H>,
        shutdown: Shutdown,
        shutdown_complete_tx: mpsc::Sender<()>,
    ) -> Self {
        FrameSession {
            connection_id,
            connection,
            frame_handler,
            shutdown,
            _shutdown_complete_tx: shutdown_complete_tx,
        }
    }

    /// Reads frames until the peer closes, a GOAWAY arrives, an error occurs
    /// or the server shuts down.
    pub async fn run(&mut self) -> AppResult<()> {
        loop {
            // a graceful close between frames yields None, anything else is an error
            let maybe_frame = tokio::select! {
                res = self.connection.read_frame() => res?,
                _ = self.shutdown.recv() => {
                    debug!("session {} exit read loop after recv shutdown signal", self.connection_id);
                    return Ok(());
                }
            };

            let frame = match maybe_frame {
                Some(frame) => frame,
                None => break,
            };
            trace!("session {} read {:?}", self.connection_id, frame.header());

            let go_away = matches!(frame, Frame::GoAway(_));
            // a peer that stops reading stalls the reply, shutdown still wins
            tokio::select! {
                res = respond(self.frame_handler.as_ref(), &mut self.connection, frame) => res?,
                _ = self.shutdown.recv() => {
                    debug!("session {} dropped a reply after recv shutdown signal", self.connection_id);
                    return Ok(());
                }
            }
            if go_away {
                debug!("session {} received GOAWAY", self.connection_id);
                break;
            }
        }
        debug!("session {} exit read loop", self.connection_id);
        Ok(())
    }
}

async fn respond<H, S>(
    frame_handler: &H,
    connection: &mut Connection<S>,
    frame: Frame,
) -> AppResult<()>
where
    H: FrameHandler,
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Some(reply) = frame_handler.handle_frame(frame).await? {
        connection.write_frame(&reply).await?;
    }
    Ok(())
}

/// Default request handler: starts a `FrameSession` task for every request.
pub struct SessionLauncher<H> {
    config: ConnectionConfig,
    frame_handler: Arc<H>,
    notify_shutdown: broadcast::Sender<()>,
    shutdown_complete_tx: mpsc::Sender<()>,
}

impl<H: FrameHandler> SessionLauncher<H> {
    pub fn new(
        config: ConnectionConfig,
        frame_handler: H,
        notify_shutdown: broadcast::Sender<()>,
        shutdown_complete_tx: mpsc::Sender<()>,
    ) -> Self {
        SessionLauncher {
            config,
            frame_handler: Arc::new(frame_handler),
            notify_shutdown,
            shutdown_complete_tx,
        }
    }
}

impl<H: FrameHandler> RequestHandler for SessionLauncher<H> {
    fn handle(&self, request: Request) -> impl Future<Output = ()> + Send {
        let Request {
            connection_id,
            peer_addr,
            socket,
        } = request;
        let mut session = FrameSession::new(
            connection_id,
            Connection::new(socket, self.config),
            self.frame_handler.clone(),
            Shutdown::subscribe(&self.notify_shutdown),
            self.shutdown_complete_tx.clone(),
        );
        async move {
            tokio::spawn(async move {
                if let Err(err) = session.run().await {
                    error!(
                        "connection {} from {} closed: {}",
                        connection_id, peer_addr, err
                    );
                }
            });
        }
    }
}
