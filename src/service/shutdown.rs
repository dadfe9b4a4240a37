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

use tokio::sync::broadcast;

/// One task's view of the server-wide shutdown broadcast.
///
/// The signal latches: after it has been seen once, `recv` never waits
/// again. A frame session waits on it at every await point of its loop, so it
/// must not block a second time. A dropped sender counts as the signal, as
/// does a lagged receiver.
#[derive(Debug)]
pub struct Shutdown {
    signalled: bool,
    notify: broadcast::Receiver<()>,
}

impl Shutdown {
    pub fn subscribe(notify_shutdown: &broadcast::Sender<()>) -> Shutdown {
        Shutdown {
            signalled: false,
            notify: notify_shutdown.subscribe(),
        }
    }

    pub fn is_signalled(&self) -> bool {
        self.signalled
    }

    pub async fn recv(&mut self) {
        if !self.signalled {
            // Ok, Closed and Lagged all mean a shutdown was requested
            let _ = self.notify.recv().await;
            self.signalled = true;
        }
    }
}
