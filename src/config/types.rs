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

//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cluster::{ClusterProvider, NodeInfo};
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub clusters: HashMap<String, Cluster>,
}

/// Global default settings.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Defaults {
    /// Cluster used when `--cluster` is not given.
    pub cluster: Option<String>,
}

/// How a cluster's nodes are attached to the host network.
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Networking {
    #[default]
    Nat,
    Bridged,
}

/// One cluster and its nodes.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Cluster {
    #[serde(default)]
    pub networking: Networking,

    #[serde(default)]
    pub nodes: HashMap<String, NodeInfo>,
}

impl ClusterProvider for Cluster {
    fn uses_nat_networking(&self) -> bool {
        self.networking == Networking::Nat
    }

    fn node(&self, name: &str) -> Option<&NodeInfo> {
        self.nodes.get(name)
    }
}

impl Config {
    /// Pick a cluster: the requested one, else the configured default, else
    /// the only cluster present.
    pub fn cluster(&self, requested: Option<&str>) -> Result<(&str, &Cluster)> {
        let name = match requested.or(self.defaults.cluster.as_deref()) {
            Some(name) => name,
            None if self.clusters.len() == 1 => {
                return self
                    .clusters
                    .iter()
                    .next()
                    .map(|(name, cluster)| (name.as_str(), cluster))
                    .ok_or(Error::NoClusterSelected);
            }
            None => return Err(Error::NoClusterSelected),
        };

        self.clusters
            .get_key_value(name)
            .map(|(name, cluster)| (name.as_str(), cluster))
            .ok_or_else(|| Error::ClusterNotFound(name.to_string()))
    }
}
