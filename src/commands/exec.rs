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
use std::io::Write;

use crate::cli::AccessArgs;
use crate::config::Config;
use crate::ssh::run_command;

/// Run `command` on `node` and print its combined output.
///
/// Output produced before a non-zero exit is still printed.
pub async fn execute_command(
    config: &Config,
    cluster: Option<&str>,
    node: &str,
    access: &AccessArgs,
    command: &[String],
) -> Result<()> {
    let endpoint = super::resolve_endpoint(config, cluster, node, "exec")?;
    let access = access.resolve();
    let command = command.join(" ");

    tracing::info!("Running '{command}' on {node} at {endpoint}");

    match run_command(&endpoint, &access.username, &access.password, &command).await {
        Ok(output) => {
            print_output(&output);
            Ok(())
        }
        Err(e) => {
            if let Some(output) = e.partial_output() {
                print_output(output);
            }
            Err(e.into())
        }
    }
}

fn print_output(output: &str) {
    if let Err(e) = write_output(&mut std::io::stdout().lock(), output) {
        tracing::debug!("Failed to write command output: {e}");
    }
}

fn write_output(out: &mut impl Write, output: &str) -> std::io::Result<()> {
    out.write_all(output.as_bytes())?;
    out.flush()
}
