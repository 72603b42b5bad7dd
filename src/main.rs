// Copyright 2025 Lablup Inc. and Jeongkyu Shin
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

use anyhow::Result;
use clap::Parser;

use knode::{
    cli::{Cli, Commands},
    commands::{cp::copy_files, exec::execute_command, ssh::ssh_node},
    config::Config,
    utils::init_logging,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<knode::Error>() {
            Some(e) => eprintln!("Error: {e}"),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(exit_code(&err));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_with_priority(cli.config.as_deref()).await?;
    let cluster = cli.cluster.as_deref();

    match &cli.command {
        Commands::Ssh { node, access } => ssh_node(&config, cluster, node, access).await,
        Commands::Exec {
            node,
            access,
            command,
        } => execute_command(&config, cluster, node, access, command).await,
        Commands::Cp {
            source,
            destination,
            recurse,
            access,
        } => copy_files(&config, cluster, source, destination, *recurse, access).await,
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<knode::Error>()
        .map_or(1, knode::Error::exit_code)
}
