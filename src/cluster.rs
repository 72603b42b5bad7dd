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

//! Cluster collaborator: node lookup and SSH endpoint resolution.
//!
//! Cluster and node lifecycle live outside this crate. Anything that can
//! describe a cluster's networking and its nodes implements
//! [`ClusterProvider`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Guest port of the SSH daemon on every node.
pub const SSH_PORT: u16 = 22;

/// Lifecycle state of a node as reported by its cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Running,
    #[default]
    Stopped,
    Unknown,
}

/// What the cluster knows about one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub status: NodeStatus,
    /// Guest port to forwarded host port.
    #[serde(default)]
    pub ports: BTreeMap<u16, u16>,
}

impl NodeInfo {
    pub fn forwarded_port(&self, node_port: u16) -> Option<u16> {
        self.ports.get(&node_port).copied()
    }

    pub fn is_running(&self) -> bool {
        self.status == NodeStatus::Running
    }
}

pub trait ClusterProvider {
    /// Whether node ports are reached through NAT port forwarding.
    fn uses_nat_networking(&self) -> bool;

    fn node(&self, name: &str) -> Option<&NodeInfo>;
}

/// Fail unless `cluster` forwards node ports through NAT.
///
/// `command` names the command in the error, e.g. `"SSH"`.
pub fn require_nat_networking(cluster: &impl ClusterProvider, command: &'static str) -> Result<()> {
    if cluster.uses_nat_networking() {
        Ok(())
    } else {
        Err(Error::NatNetworkingRequired(command))
    }
}

/// Resolve the local `host:port` endpoint forwarding to a node's SSH port.
pub fn node_ssh_endpoint(cluster: &impl ClusterProvider, node_name: &str) -> Result<String> {
    let node = cluster
        .node(node_name)
        .ok_or_else(|| Error::NodeNotFound(node_name.to_string()))?;

    if !node.is_running() {
        return Err(Error::NodeNotRunning(node_name.to_string()));
    }

    let port = node
        .forwarded_port(SSH_PORT)
        .ok_or_else(|| Error::SshPortNotForwarded(node_name.to_string()))?;

    Ok(format!("localhost:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticCluster {
        nat: bool,
        nodes: HashMap<String, NodeInfo>,
    }

    impl ClusterProvider for StaticCluster {
        fn uses_nat_networking(&self) -> bool {
            self.nat
        }

        fn node(&self, name: &str) -> Option<&NodeInfo> {
            self.nodes.get(name)
        }
    }

    fn cluster() -> StaticCluster {
        let mut nodes = HashMap::new();
        nodes.insert(
            "node1".to_string(),
            NodeInfo {
                status: NodeStatus::Running,
                ports: BTreeMap::from([(22, 10022)]),
            },
        );
        nodes.insert(
            "node2".to_string(),
            NodeInfo {
                status: NodeStatus::Stopped,
                ports: BTreeMap::from([(22, 10023)]),
            },
        );
        nodes.insert(
            "node3".to_string(),
            NodeInfo {
                status: NodeStatus::Running,
                ports: BTreeMap::from([(80, 8080)]),
            },
        );
        StaticCluster { nat: true, nodes }
    }

    #[test]
    fn test_endpoint_for_running_node() {
        assert_eq!(node_ssh_endpoint(&cluster(), "node1").unwrap(), "localhost:10022");
    }

    #[test]
    fn test_endpoint_errors() {
        let cluster = cluster();

        let err = node_ssh_endpoint(&cluster, "node9").unwrap_err();
        assert_eq!(err.to_string(), "node 'node9' not found");
        assert_eq!(err.exit_code(), 2);

        let err = node_ssh_endpoint(&cluster, "node2").unwrap_err();
        assert_eq!(err.to_string(), "node 'node2' is not running");
        assert_eq!(err.exit_code(), 1);

        let err = node_ssh_endpoint(&cluster, "node3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "the SSH port of node 'node3' has not been forwarded"
        );
    }

    #[test]
    fn test_nat_required() {
        let mut cluster = cluster();
        assert!(require_nat_networking(&cluster, "SSH").is_ok());

        cluster.nat = false;
        let err = require_nat_networking(&cluster, "SSH").unwrap_err();
        assert_eq!(
            err.to_string(),
            "the SSH command currently only works on clusters that use NAT networking"
        );
    }
}
