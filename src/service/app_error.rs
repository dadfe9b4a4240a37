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

pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by the codec, the connection plumbing and startup.
///
/// `Transport`, `Io` and `FrameFormat` end the connection they happened on and
/// nothing else. `Listener` is fatal at startup. `Accept` is only ever logged
/// by the accept loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame: {0}")]
    FrameFormat(String),

    #[error("listener error: {0}")]
    Listener(String),

    #[error("accept error: {0}")]
    Accept(String),

    #[error("hand-off error: {0}")]
    HandOff(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("config file error: {0}")]
    ConfigFileError(#[from] config::ConfigError),

    #[error("tracing init error: {0}")]
    TracingInit(String),

    /// marker error, more bytes are needed before a frame can be parsed
    #[error("incomplete frame")]
    Incomplete,
}
