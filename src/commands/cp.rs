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
use crate::copy::{execute_plan, parse_argument, plan, Direction};

/// Copy between the local host and a node.
pub async fn copy_files(
    config: &Config,
    cluster: Option<&str>,
    source: &str,
    destination: &str,
    recurse: bool,
    access: &AccessArgs,
) -> Result<()> {
    // Cluster problems are reported before argument problems.
    let (_, selected) = config.cluster(cluster)?;
    crate::cluster::require_nat_networking(selected, "scp")?;

    let source = parse_argument(source)?;
    let destination = parse_argument(destination)?;
    let plan = plan(&source, &destination, recurse)?;

    let endpoint = super::resolve_endpoint(config, cluster, &plan.node, "scp")?;
    let access = access.resolve();

    let verb = match plan.direction {
        Direction::ToNode => "Copying to node",
        Direction::FromNode => "Copying from node",
    };
    println!("{} {}", verb.cyan(), format!("{}...", plan.node).bold());
    tracing::info!("Copy {plan} via {endpoint}");

    execute_plan(&plan, &endpoint, &access.username, &access.password).await?;

    println!("{} {}", "●".green(), "Copy complete".green());
    Ok(())
}
