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

//! Framing layer and connection-dispatch core for an HTTP/2-style
//! multiplexed binary protocol.

pub mod frame;
pub mod network;
pub mod request;
mod service;

pub use service::{
    setup_local_tracing, setup_tracing, Acceptor, AppError, AppResult, Daemon, DispatchConfig,
    LogConfig, NetworkConfig, ProtocolConfig, Server, ServerConfig, Shutdown, TracingGuard,
    DEFAULT_LISTEN_ADDR,
};
