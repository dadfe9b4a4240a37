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

use clap::Parser;
use dotenv::dotenv;
use tokio::runtime;

use muxframe::{setup_tracing, AppResult, Daemon, ServerConfig};

#[derive(Parser)]
#[command(version, about)]
pub struct CommandLine {
    /// address to listen on, ":port" listens on every interface [default: :5001]
    #[arg(long = "listenAddr", value_name = "ADDR")]
    pub listen_addr: Option<String>,
    /// path to config file
    #[arg(short = 'c', long = "conf")]
    pub conf: Option<String>,
    /// log level (v: info, vv: debug, vvv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn main() -> AppResult<()> {
    dotenv().ok();
    let commandline = CommandLine::parse();

    let server_config = ServerConfig::set_up_config(
        commandline.conf.as_deref(),
        commandline.listen_addr.as_deref(),
    )?;
    let _tracing_guard = setup_tracing(commandline.verbose, &server_config.log.dir)?;

    // startup tokio runtime
    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;

    let daemon = Daemon::new(server_config);
    daemon.start(&rt)?;
    Ok(())
}
