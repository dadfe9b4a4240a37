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
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tracing::{debug, error};

use crate::request::{HandOffSender, Request};
use crate::{AppError, AppResult};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

const ACCEPT_INITIAL_DELAY: Duration = Duration::from_millis(10);
const ACCEPT_MAX_DELAY: Duration = Duration::from_secs(1);

/// Source of accepted connections for the accept loop.
pub trait Acceptor: Send + Sync + 'static {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl Acceptor for TcpListener {
    fn accept(&self) -> impl Future<Output = io::Result<(TcpStream, SocketAddr)>> + Send {
        TcpListener::accept(self)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

/// Errors after which the listener cannot produce another connection.
fn is_fatal(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::NotConnected | io::ErrorKind::Unsupported
    )
}

/// Errors caused by one peer, the next accept can be tried at once.
fn is_peer_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

// handler for each accepted connection
struct ConnectionHandler {
    request: Request,
    hand_off: HandOffSender,
}

impl ConnectionHandler {
    /// Hands the connection to the dispatcher and waits until it is taken.
    /// On failure the socket is dropped, which closes it.
    async fn handle_connection(self) -> AppResult<()> {
        let connection_id = self.request.connection_id;
        self.hand_off.send(self.request).await?;
        debug!("connection {} dispatched", connection_id);
        Ok(())
    }
}

pub struct Server<A = TcpListener> {
    acceptor: A,
    hand_off: HandOffSender,
}

impl<A: Acceptor> Server<A> {
    pub fn new(acceptor: A, hand_off: HandOffSender) -> Self {
        Server { acceptor, hand_off }
    }

    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.acceptor
            .local_addr()
            .map_err(|err| AppError::Listener(err.to_string()))
    }

    /// Accepts connections until the listener fails for good.
    ///
    /// Every accepted socket gets its own connection id and its own task
    /// that hands it to the dispatcher, so a slow hand-off never holds up
    /// the next accept. A failed accept is logged and the loop goes on: at
    /// once after a peer error, after an exponential pause (10ms up to 1s)
    /// for anything else, such as running out of file descriptors.
    ///
    /// Stops only by being dropped (shutdown) or with `AppError::Listener`.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self) -> AppResult<()> {
        let mut delay = ACCEPT_INITIAL_DELAY;
        loop {
            let (socket, peer_addr) = match self.acceptor.accept().await {
                Ok(accepted) => {
                    delay = ACCEPT_INITIAL_DELAY;
                    accepted
                }
                Err(err) if is_fatal(&err) => {
                    return Err(AppError::Listener(format!("listener is unusable: {}", err)));
                }
                Err(err) if is_peer_error(&err) => {
                    error!("{}", AppError::Accept(err.to_string()));
                    tokio::task::yield_now().await;
                    continue;
                }
                Err(err) => {
                    error!("{}, retry in {:?}", AppError::Accept(err.to_string()), delay);
                    time::sleep(delay).await;
                    delay = (delay * 2).min(ACCEPT_MAX_DELAY);
                    continue;
                }
            };

            let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
            debug!("accept new connection {} from {}", connection_id, peer_addr);

            let handler = ConnectionHandler {
                request: Request::new(connection_id, peer_addr, socket),
                hand_off: self.hand_off.clone(),
            };
            tokio::spawn(async move {
                if let Err(err) = handler.handle_connection().await {
                    error!("connection {} from {}: {}", connection_id, peer_addr, err);
                }
            });
        }
    }
}

impl<A> Drop for Server<A> {
    fn drop(&mut self) {
        debug!("tcp server dropped");
    }
}
