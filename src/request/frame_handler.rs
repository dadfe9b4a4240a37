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

use tracing::{debug, trace};

use crate::frame::{Frame, PingFrame, SettingsFrame};
use crate::AppResult;

/// Receives every frame a session reads, in wire order.
///
/// A returned frame is written back on the same connection before the next
/// frame is read. An error closes the connection.
pub trait FrameHandler: Send + Sync + 'static {
    fn handle_frame(&self, frame: Frame) -> impl Future<Output = AppResult<Option<Frame>>> + Send;
}

/// Connection-level replies only: PING and SETTINGS are acknowledged,
/// everything else is traced and dropped.
#[derive(Debug, Default, Copy, Clone)]
pub struct ConnectionFrameHandler;

impl FrameHandler for ConnectionFrameHandler {
    fn handle_frame(&self, frame: Frame) -> impl Future<Output = AppResult<Option<Frame>>> + Send {
        async move {
            let reply = match frame {
                Frame::Ping(ping) if !ping.is_ack() => {
                    Some(Frame::from(PingFrame::ack(ping.opaque_data)))
                }
                Frame::Settings(settings) if !settings.is_ack() => {
                    debug!("peer sent {} settings", settings.settings.len());
                    Some(Frame::from(SettingsFrame::ack()))
                }
                Frame::Unknown(unknown) => {
                    debug!(
                        "skipped frame of unknown type {:?}, {} bytes",
                        unknown.header.frame_type,
                        unknown.payload.len()
                    );
                    None
                }
                other => {
                    trace!("received {:?}", other.header());
                    None
                }
            };
            Ok(reply)
        }
    }
}
