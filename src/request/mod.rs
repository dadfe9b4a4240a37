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

//! Hand-off of accepted connections to the dispatch core.
//!
//! A connection handler wraps each accepted socket into a `Request` and
//! sends it through the hand-off channel. The single `Dispatcher` receives
//! requests one at a time and starts a `FrameSession` for each.

mod dispatcher;
mod frame_handler;
mod hand_off;
mod session;

use std::net::SocketAddr;

use tokio::net::TcpStream;

pub use dispatcher::{Dispatcher, RequestHandler};
pub use frame_handler::{ConnectionFrameHandler, FrameHandler};
pub use hand_off::{channel, HandOffReceiver, HandOffSender};
pub use session::{FrameSession, SessionLauncher};

/// One accepted connection, before any frame has been read from it.
#[derive(Debug)]
pub struct Request {
    pub connection_id: u64,
    pub peer_addr: SocketAddr,
    pub socket: TcpStream,
}

impl Request {
    pub fn new(connection_id: u64, peer_addr: SocketAddr, socket: TcpStream) -> Self {
        Request {
            connection_id,
            peer_addr,
            socket,
        }
    }
}
