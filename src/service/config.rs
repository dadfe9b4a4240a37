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

use serde::{Deserialize, Serialize};

use crate::frame::{FrameRegistry, UnknownFramePolicy, MAX_FRAME_LENGTH};
use crate::network::ConnectionConfig;
use crate::{AppError, AppResult};

pub const DEFAULT_LISTEN_ADDR: &str = ":5001";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// `host:port`; a bare `:port` listens on every interface
    pub listen_addr: String,
    pub conn_read_buffer_size: usize,
}

impl NetworkConfig {
    /// The address handed to `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProtocolConfig {
    pub max_frame_size: u32,
    pub unknown_frame_policy: UnknownFramePolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// slots queued in front of the dispatcher, a send still waits for receipt
    pub hand_off_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// directory of the hourly rolling log file
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    pub protocol: ProtocolConfig,
    pub dispatch: DispatchConfig,
    pub log: LogConfig,
}

impl ServerConfig {
    /// Layers built-in defaults, the optional config file, `MUXFRAME__*`
    /// environment variables and finally the command line listen address.
    pub fn set_up_config(path: Option<&str>, listen_addr: Option<&str>) -> AppResult<ServerConfig> {
        let mut builder = config::Config::builder()
            .set_default("network.listen_addr", DEFAULT_LISTEN_ADDR)?
            .set_default("network.conn_read_buffer_size", 4096i64)?
            .set_default("protocol.max_frame_size", 16384i64)?
            .set_default("protocol.unknown_frame_policy", "skip")?
            .set_default("dispatch.hand_off_capacity", 1i64)?
            .set_default("log.dir", "logs")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("MUXFRAME")
                .separator("__")
                .try_parsing(true),
        );
        if let Some(listen_addr) = listen_addr {
            builder = builder.set_override("network.listen_addr", listen_addr)?;
        }

        let server_config: ServerConfig = builder.build()?.try_deserialize()?;
        server_config.validate()?;
        Ok(server_config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.network.listen_addr.is_empty() {
            return Err(AppError::InvalidValue(
                "network.listen_addr must not be empty".to_string(),
            ));
        }
        if self.network.conn_read_buffer_size == 0 {
            return Err(AppError::InvalidValue(
                "network.conn_read_buffer_size must be positive".to_string(),
            ));
        }
        if self.protocol.max_frame_size == 0 || self.protocol.max_frame_size > MAX_FRAME_LENGTH {
            return Err(AppError::InvalidValue(format!(
                "protocol.max_frame_size must be within 1..={}, got {}",
                MAX_FRAME_LENGTH, self.protocol.max_frame_size
            )));
        }
        Ok(())
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            read_buffer_size: self.network.conn_read_buffer_size,
            max_frame_size: self.protocol.max_frame_size,
            registry: FrameRegistry::new(self.protocol.unknown_frame_policy),
        }
    }
}
