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
use owo_colors::OwoColorize;

use crate::cli::AccessArgs;
use crate::config::Config;
use crate::pty::run_interactive_shell;

/// Open an interactive shell on `node`.
pub async fn ssh_node(
    config: &Config,
    cluster: Option<&str>,
    node: &str,
    access: &AccessArgs,
) -> Result<()> {
    let endpoint = super::resolve_endpoint(config, cluster, node, "SSH")?;
    let access = access.resolve();

    println!(
        "{} {}",
        "Connecting to node".cyan(),
        format!("{node}...").bold()
    );
    tracing::info!("Opening shell on {node} at {endpoint}");

    run_interactive_shell(&endpoint, &access.username, &access.password).await;
    Ok(())
}
