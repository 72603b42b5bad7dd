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

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AccessOptions, DEFAULT_PASSWORD, DEFAULT_USERNAME};

#[derive(Parser, Debug)]
#[command(
    name = "knode",
    version,
    about = "Shell, command and file copy access to cluster nodes",
    long_about = "knode reaches the nodes of a local cluster through their forwarded SSH ports.\nIt opens interactive shells, runs single commands, and copies files and directories\nbetween the local host and one node using SFTP.\nOnly clusters that use NAT networking are supported.",
    after_help = "EXAMPLES:\n  Open a shell:            knode ssh node1\n  Run a command:           knode exec node1 -- uname -a\n  Copy a file to a node:   knode cp ./app.conf node1:/etc/app/\n  Copy a directory back:   knode cp -r node1:/var/log/app ./logs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'F',
        long,
        help = "Configuration file path\nConfig loading priority:\n  1. This flag's value\n  2. Current directory (./knode.yaml)\n  3. User config (~/.config/knode/config.yaml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'C',
        long,
        env = "KNODE_CLUSTER",
        help = "Cluster name from configuration file (defaults to defaults.cluster)"
    )]
    pub cluster: Option<String>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

/// Credentials shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct AccessArgs {
    #[arg(short = 'u', long, default_value = DEFAULT_USERNAME, help = "Username for the SSH connection")]
    pub username: String,

    #[arg(short = 'p', long, default_value = DEFAULT_PASSWORD, help = "Password for the SSH connection")]
    pub password: String,
}

impl AccessArgs {
    pub fn resolve(&self) -> AccessOptions {
        AccessOptions::resolve(&self.username, &self.password)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Open an interactive shell on a node",
        long_about = "Opens an interactive shell on the node with a pseudo-terminal attached to the local terminal.\nThe local terminal is put in raw mode for the duration of the session and restored afterwards.\nSIGINT or SIGTERM delivered to knode closes the session."
    )]
    Ssh {
        #[arg(help = "Name of the node")]
        node: String,

        #[command(flatten)]
        access: AccessArgs,
    },

    #[command(
        about = "Run a single command on a node",
        long_about = "Runs one command on the node and prints its combined stdout and stderr.\n\nExit codes: 0 (success), 1 (connection failure or non-zero remote exit)",
        after_help = "Examples:\n  knode exec node1 -- df -h\n  knode -C lab exec node2 -- 'systemctl status sshd'"
    )]
    Exec {
        #[arg(help = "Name of the node")]
        node: String,

        #[command(flatten)]
        access: AccessArgs,

        #[arg(trailing_var_arg = true, required = true, help = "Command to run")]
        command: Vec<String>,
    },

    #[command(
        visible_alias = "scp",
        about = "Copy files between the local host and a node",
        long_about = "Copies a file or directory between the local host and one node over SFTP.\nExactly one of SOURCE and DEST must name a node, as NODE:PATH.\nNode names are 2 to 10 lowercase letters or digits, starting with a letter.\nA single-letter prefix such as C:file is treated as a local Windows path.\nAn empty remote path means the remote home directory.",
        after_help = "Examples:\n  knode cp app.conf node1:/etc/app/\n  knode cp node1:/etc/hosts ./hosts.node1\n  knode cp -r ./configs node1:\n\nExit codes: 0 (success), 1 (invalid arguments or copy failure), 2 (missing source or node)"
    )]
    Cp {
        #[arg(help = "Source, either a local path or NODE:PATH")]
        source: String,

        #[arg(help = "Destination, either a local path or NODE:PATH")]
        destination: String,

        #[arg(short = 'r', long = "recurse", alias = "recursive", help = "Copy directories recursively")]
        recurse: bool,

        #[command(flatten)]
        access: AccessArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_defaults() {
        let cli = Cli::try_parse_from(["knode", "ssh", "node1"]).unwrap();
        match cli.command {
            Commands::Ssh { node, access } => {
                assert_eq!(node, "node1");
                assert_eq!(access.username, "user1");
                assert_eq!(access.password, "Pass@word1");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_exec_collects_command() {
        let cli = Cli::try_parse_from([
            "knode", "-C", "lab", "exec", "node1", "-u", "root", "--", "ls", "-la", "/tmp",
        ])
        .unwrap();
        assert_eq!(cli.cluster.as_deref(), Some("lab"));
        match cli.command {
            Commands::Exec {
                node,
                access,
                command,
            } => {
                assert_eq!(node, "node1");
                assert_eq!(access.username, "root");
                assert_eq!(command, vec!["ls", "-la", "/tmp"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_scp_alias_and_recurse() {
        let cli = Cli::try_parse_from(["knode", "scp", "-r", "dir", "node1:"]).unwrap();
        match cli.command {
            Commands::Cp {
                source,
                destination,
                recurse,
                ..
            } => {
                assert_eq!(source, "dir");
                assert_eq!(destination, "node1:");
                assert!(recurse);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["knode", "-vv", "ssh", "node1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_empty_username_resolves_defaults() {
        let cli = Cli::try_parse_from(["knode", "ssh", "node1", "-u", "", "-p", "x"]).unwrap();
        let Commands::Ssh { access, .. } = cli.command else {
            panic!("expected ssh");
        };
        let resolved = access.resolve();
        assert_eq!(resolved.username, "user1");
        assert_eq!(resolved.password.as_str(), "Pass@word1");
    }
}
