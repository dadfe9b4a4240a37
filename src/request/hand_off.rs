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

use tokio::sync::oneshot;
use tracing::trace;

use super::Request;
use crate::{AppError, AppResult};

struct Envelope {
    request: Request,
    received_tx: oneshot::Sender<()>,
}

/// Creates the hand-off channel between connection handlers and the dispatcher.
///
/// `capacity` only sizes the queue in front of the dispatcher; a send still
/// completes only once the dispatcher has taken the request, so a busy
/// dispatcher holds every handler at its send.
pub fn channel(capacity: usize) -> (HandOffSender, HandOffReceiver) {
    let (tx, rx) = async_channel::bounded(capacity.max(1));
    (HandOffSender { tx }, HandOffReceiver { rx })
}

#[derive(Clone)]
pub struct HandOffSender {
    tx: async_channel::Sender<Envelope>,
}

impl HandOffSender {
    /// Sends `request` and waits until the dispatcher has received it.
    ///
    /// An error means the request was abandoned: the dispatcher is gone or
    /// dropped it on shutdown. The request, and with it the socket, is dropped.
    pub async fn send(&self, request: Request) -> AppResult<()> {
        let connection_id = request.connection_id;
        let (received_tx, received_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                received_tx,
            })
            .await
            .map_err(|_| {
                AppError::HandOff(format!(
                    "dispatcher is closed, connection {} abandoned",
                    connection_id
                ))
            })?;
        received_rx.await.map_err(|_| {
            AppError::HandOff(format!(
                "connection {} dropped before dispatch",
                connection_id
            ))
        })
    }
}

pub struct HandOffReceiver {
    rx: async_channel::Receiver<Envelope>,
}

impl HandOffReceiver {
    /// Takes the next request and releases its sender.
    /// Returns `None` once every sender is gone.
    pub async fn recv(&self) -> Option<Request> {
        let Envelope {
            request,
            received_tx,
        } = self.rx.recv().await.ok()?;
        // the handler may have given up already, the request is ours either way
        let _ = received_tx.send(());
        Some(request)
    }

    /// Closes the channel and drops whatever is still queued, without
    /// acknowledging it. Returns the number of abandoned requests.
    pub fn close(&self) -> usize {
        self.rx.close();
        let mut abandoned = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            trace!(
                "abandon queued connection {}",
                envelope.request.connection_id
            );
            abandoned += 1;
        }
        abandoned
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::*;
    use crate::request::test_support::loopback_request;

    #[tokio::test]
    async fn test_send_waits_for_receiver() {
        let (sender, receiver) = channel(1);
        let (request, _client) = loopback_request(1).await;

        let mut send = tokio::spawn(async move { sender.send(request).await });
        // the request fits in the queue but nobody has taken it yet
        assert!(time::timeout(Duration::from_millis(50), &mut send)
            .await
            .is_err());

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.connection_id, 1);
        send.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_send_after_receiver_closed_is_abandoned() {
        let (sender, receiver) = channel(1);
        assert_eq!(receiver.close(), 0);
        let (request, _client) = loopback_request(2).await;
        let result = sender.send(request).await;
        assert!(matches!(result, Err(AppError::HandOff(_))));
    }

    #[tokio::test]
    async fn test_close_abandons_queued_requests() {
        let (sender, receiver) = channel(1);
        let (request, _client) = loopback_request(3).await;
        let send = tokio::spawn(async move { sender.send(request).await });

        // let the send land in the queue
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(receiver.close(), 1);
        assert!(matches!(send.await.unwrap(), Err(AppError::HandOff(_))));
    }

    #[tokio::test]
    async fn test_recv_returns_none_when_senders_are_gone() {
        let (sender, receiver) = channel(1);
        drop(sender);
        assert!(receiver.recv().await.is_none());
    }
}
