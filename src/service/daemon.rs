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

use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, trace};

use super::{Server, ServerConfig, Shutdown};
use crate::request::{channel, ConnectionFrameHandler, Dispatcher, SessionLauncher};
use crate::{AppError, AppResult};

/// Wires the accept loop, the dispatcher and the frame sessions together.
pub struct Daemon {
    config: ServerConfig,
}

impl Daemon {
    pub fn new(config: ServerConfig) -> Self {
        Daemon { config }
    }

    /// Blocks on `rt` until Ctrl-C or a fatal listener error.
    pub fn start(&self, rt: &Runtime) -> AppResult<()> {
        rt.block_on(self.serve(async {
            if let Err(err) = signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {}", err);
            }
        }))
    }

    /// Binds the configured address, then runs until `shutdown_signal` completes.
    pub async fn serve<F>(&self, shutdown_signal: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let listen_address = self.config.network.bind_address();
        let listener = TcpListener::bind(&listen_address).await.map_err(|err| {
            let error_msg = format!(
                "Failed to bind server to address: {} - Error: {}",
                listen_address, err
            );
            error!("{}", error_msg);
            AppError::Listener(error_msg)
        })?;
        self.serve_with_listener(listener, shutdown_signal).await
    }

    /// Graceful shutdown: the accept loop is dropped, the dispatcher stops
    /// receiving and abandons what is still queued, every frame session exits
    /// on the broadcast signal. Returns once all of them have released their
    /// `shutdown_complete` sender.
    pub async fn serve_with_listener<F>(
        &self,
        listener: TcpListener,
        shutdown_signal: F,
    ) -> AppResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let (notify_shutdown, _) = broadcast::channel(1);
        let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::channel::<()>(1);

        let (hand_off, receiver) = channel(self.config.dispatch.hand_off_capacity);
        let launcher = SessionLauncher::new(
            self.config.connection_config(),
            ConnectionFrameHandler,
            notify_shutdown.clone(),
            shutdown_complete_tx.clone(),
        );
        let dispatcher = Dispatcher::new(
            receiver,
            launcher,
            Shutdown::subscribe(&notify_shutdown),
        );
        tokio::spawn(dispatcher.run());

        let server = Server::new(listener, hand_off);
        info!("server running, listen_addr={}", server.local_addr()?);

        let result = tokio::select! {
            res = server.run() => {
                if let Err(err) = &res {
                    error!(cause = %err, "failed to accept");
                }
                res
            }
            _ = shutdown_signal => {
                info!("get shutdown signal");
                Ok(())
            }
        };
        drop(server);

        if notify_shutdown.send(()).is_err() {
            debug!("no task left to notify");
        }
        drop(shutdown_complete_tx);
        trace!("waiting for shutdown complete...");
        let _ = shutdown_complete_rx.recv().await;
        info!("server shutdown complete");
        result
    }
}
