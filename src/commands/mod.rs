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

//! Subcommand implementations.

use anyhow::Result;

use crate::cluster::{node_ssh_endpoint, require_nat_networking};
use crate::config::Config;

pub mod cp;
pub mod exec;
pub mod ssh;

/// Look up the SSH endpoint of `node` on the selected cluster.
///
/// `command` names the subcommand in the NAT networking error.
pub(crate) fn resolve_endpoint(
    config: &Config,
    cluster: Option<&str>,
    node: &str,
    command: &'static str,
) -> Result<String> {
    let (cluster_name, cluster) = config.cluster(cluster)?;
    tracing::debug!("Using cluster '{cluster_name}'");

    require_nat_networking(cluster, command)?;
    Ok(node_ssh_endpoint(cluster, node)?)
}
