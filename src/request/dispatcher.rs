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

use tracing::{debug, info};

use super::{HandOffReceiver, Request};
use crate::Shutdown;

/// Work done for every request the dispatcher receives.
///
/// The dispatcher awaits `handle` before taking the next request, so a slow
/// handler holds back every connection waiting in the hand-off channel.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, request: Request) -> impl Future<Output = ()> + Send;
}

/// The single consumer of the hand-off channel.
pub struct Dispatcher<H> {
    receiver: HandOffReceiver,
    handler: H,
    shutdown: Shutdown,
}

impl<H: RequestHandler> Dispatcher<H> {
    pub fn new(receiver: HandOffReceiver, handler: H, shutdown: Shutdown) -> Self {
        Dispatcher {
            receiver,
            handler,
            shutdown,
        }
    }

    /// Receives requests until the shutdown signal arrives or every sender is gone.
    ///
    /// On shutdown, requests still queued are dropped rather than dispatched;
    /// their handlers see the hand-off fail.
    pub async fn run(mut self) {
        debug!("dispatcher started");
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.recv() => {
                    debug!("dispatcher received shutdown signal");
                    break;
                }
                request = self.receiver.recv() => match request {
                    Some(request) => {
                        debug!(
                            connection_id = request.connection_id,
                            peer = %request.peer_addr,
                            "request dispatched"
                        );
                        self.handler.handle(request).await;
                    }
                    None => {
                        debug!("hand-off channel closed");
                        break;
                    }
                },
            }
        }
        let abandoned = self.receiver.close();
        if abandoned > 0 {
            info!("dispatcher stopped, {} queued connections abandoned", abandoned);
        }
        debug!("dispatcher exited");
    }
}
