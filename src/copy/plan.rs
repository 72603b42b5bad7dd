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

//! Routing of a copy argument pair to a transfer plan.

use std::fmt;

use super::argument::CopyArgument;
use crate::error::{Error, Result};

/// Remote path used when a node destination names no path.
const DEFAULT_REMOTE_PATH: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToNode,
    FromNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    File,
    Directory,
}

/// A validated copy between the local host and one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub direction: Direction,
    pub node: String,
    pub source_path: String,
    pub dest_path: String,
    pub recursive: bool,
    pub mode: TransferMode,
}

impl fmt::Display for TransferPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::ToNode => write!(
                f,
                "{} -> {}:{}",
                self.source_path, self.node, self.dest_path
            ),
            Direction::FromNode => write!(
                f,
                "{}:{} -> {}",
                self.node, self.source_path, self.dest_path
            ),
        }
    }
}

/// Validate a source/destination pair and decide direction and mode.
pub fn plan(source: &CopyArgument, dest: &CopyArgument, recursive: bool) -> Result<TransferPlan> {
    if !source.has_node && !dest.has_node {
        return Err(Error::validation("must specify at least one node"));
    }
    if source.has_node && dest.has_node {
        return Err(Error::validation("copying between nodes is not supported"));
    }

    if !source.has_node && !source.exists_locally {
        return Err(Error::Validation {
            message: format!("'{}': no such file or directory", source.file_path),
            exit_code: 2,
        });
    }

    let dest_path = if dest.has_node && dest.file_path.is_empty() {
        DEFAULT_REMOTE_PATH.to_string()
    } else {
        dest.file_path.clone()
    };

    if !source.has_node && source.is_local_directory && !recursive {
        return Err(Error::validation(format!(
            "'{}' is a directory. Use the --recurse option.",
            source.file_path
        )));
    }

    let (direction, node, mode) = if source.has_node {
        let mode = if recursive {
            TransferMode::Directory
        } else {
            TransferMode::File
        };
        (Direction::FromNode, source.node(), mode)
    } else {
        let mode = if source.is_local_directory {
            TransferMode::Directory
        } else {
            TransferMode::File
        };
        (Direction::ToNode, dest.node(), mode)
    };

    Ok(TransferPlan {
        direction,
        node: node.to_string(),
        source_path: source.file_path.clone(),
        dest_path,
        recursive,
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(path: &str, exists: bool, dir: bool) -> CopyArgument {
        CopyArgument {
            node_name: None,
            file_path: path.to_string(),
            has_node: false,
            is_windows_path: false,
            exists_locally: exists,
            is_local_directory: dir,
        }
    }

    fn remote(node: &str, path: &str) -> CopyArgument {
        CopyArgument {
            node_name: Some(node.to_string()),
            file_path: path.to_string(),
            has_node: true,
            is_windows_path: false,
            exists_locally: false,
            is_local_directory: false,
        }
    }

    fn message(err: Error) -> (String, i32) {
        let code = err.exit_code();
        (err.to_string(), code)
    }

    #[test]
    fn test_requires_a_node() {
        let err = plan(&local("a", true, false), &local("b", false, false), false).unwrap_err();
        assert_eq!(message(err), ("must specify at least one node".to_string(), 1));
    }

    #[test]
    fn test_rejects_node_to_node() {
        let err = plan(&remote("node1", "a"), &remote("node2", "b"), false).unwrap_err();
        assert_eq!(
            message(err),
            ("copying between nodes is not supported".to_string(), 1)
        );
    }

    #[test]
    fn test_missing_local_source_exits_2() {
        let err = plan(&local("gone.txt", false, false), &remote("node1", "x"), false).unwrap_err();
        assert_eq!(
            message(err),
            ("'gone.txt': no such file or directory".to_string(), 2)
        );
    }

    #[test]
    fn test_directory_needs_recurse() {
        let err = plan(&local("dir", true, true), &remote("node1", "x"), false).unwrap_err();
        assert_eq!(
            message(err),
            ("'dir' is a directory. Use the --recurse option.".to_string(), 1)
        );

        let plan = plan(&local("dir", true, true), &remote("node1", "x"), true).unwrap();
        assert_eq!(plan.mode, TransferMode::Directory);
        assert_eq!(plan.direction, Direction::ToNode);
    }

    #[test]
    fn test_empty_remote_destination_defaults_to_home() {
        let plan = plan(&local("f.txt", true, false), &remote("node1", ""), false).unwrap();
        assert_eq!(plan.dest_path, ".");
        assert_eq!(plan.node, "node1");
        assert_eq!(plan.mode, TransferMode::File);
        assert_eq!(plan.to_string(), "f.txt -> node1:.");
    }

    #[test]
    fn test_from_node_skips_local_checks() {
        let plan = plan(&remote("node1", "/etc/hosts"), &local("out", false, false), false).unwrap();
        assert_eq!(plan.direction, Direction::FromNode);
        assert_eq!(plan.node, "node1");
        assert_eq!(plan.mode, TransferMode::File);

        let plan = super::plan(&remote("node1", "logs"), &local("out", false, false), true).unwrap();
        assert_eq!(plan.mode, TransferMode::Directory);
    }
}
