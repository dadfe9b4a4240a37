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

//! Network Module Implementation
//!
//! Turns a connection's byte stream into frames and back.
//!
//! # Components
//!
//! - `Connection`: buffered reads and writes of whole frames on one stream
//! - `RawFrame`: cuts one header plus exactly `length` body bytes off the
//!   read buffer, enforcing the frame size limit

pub use connection::{Connection, ConnectionConfig};
pub use frame::RawFrame;
mod connection;
mod frame;
