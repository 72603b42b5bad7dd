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

//! Classification of copy arguments.
//!
//! An argument is either a bare local path, a Windows drive path such as
//! `C:file`, or a node-tagged path such as `node1:/tmp/file`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io;

use crate::error::{Error, Result};

/// Optional `<prefix>:` followed by a colon-free remainder. A one-letter
/// prefix is a drive letter, a longer one is a node name.
static ARGUMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<prefix>[A-Z]|[a-z][a-z0-9]{0,9}):)?(?P<path>[^:]*)$")
        .expect("copy argument pattern is valid")
});

/// One side of a copy command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyArgument {
    pub node_name: Option<String>,
    pub file_path: String,
    pub has_node: bool,
    pub is_windows_path: bool,
    pub exists_locally: bool,
    pub is_local_directory: bool,
}

/// Parse a raw copy argument and inspect the local filesystem at its path.
///
/// The inspection runs for node-tagged arguments too, against the local path of
/// the same name.
pub fn parse_argument(raw: &str) -> Result<CopyArgument> {
    let captures = ARGUMENT_PATTERN
        .captures(raw)
        .ok_or_else(|| Error::Argument(raw.to_string()))?;

    let path = captures.name("path").map_or("", |m| m.as_str());

    let mut argument = match captures.name("prefix").map(|m| m.as_str()) {
        Some(prefix) if prefix.len() == 1 => CopyArgument::local(raw, true),
        Some(node) => CopyArgument {
            node_name: Some(node.to_string()),
            has_node: true,
            ..CopyArgument::local(path, false)
        },
        None => CopyArgument::local(path, false),
    };

    argument.inspect_local()?;
    Ok(argument)
}

impl CopyArgument {
    fn local(file_path: &str, is_windows_path: bool) -> Self {
        Self {
            node_name: None,
            file_path: file_path.to_string(),
            has_node: false,
            is_windows_path,
            exists_locally: false,
            is_local_directory: false,
        }
    }

    fn inspect_local(&mut self) -> Result<()> {
        match std::fs::metadata(&self.file_path) {
            Ok(metadata) => {
                self.exists_locally = true;
                self.is_local_directory = metadata.is_dir();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.exists_locally = false;
                self.is_local_directory = false;
                Ok(())
            }
            Err(source) => Err(Error::LocalPathCheck {
                path: self.file_path.clone(),
                source,
            }),
        }
    }

    /// Node name, or an empty string for local arguments.
    pub fn node(&self) -> &str {
        self.node_name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_path() {
        let arg = parse_argument("no-such-file-here.tmp").unwrap();
        assert!(!arg.has_node);
        assert!(!arg.is_windows_path);
        assert_eq!(arg.node_name, None);
        assert_eq!(arg.file_path, "no-such-file-here.tmp");
        assert!(!arg.exists_locally);
    }

    #[test]
    fn test_node_path() {
        let arg = parse_argument("node1:/var/none/file1").unwrap();
        assert!(arg.has_node);
        assert_eq!(arg.node(), "node1");
        assert_eq!(arg.file_path, "/var/none/file1");
    }

    #[test]
    fn test_windows_paths_keep_prefix() {
        for raw in ["c:file1", "C:file1"] {
            let arg = parse_argument(raw).unwrap();
            assert!(arg.is_windows_path, "{raw}");
            assert!(!arg.has_node, "{raw}");
            assert_eq!(arg.file_path, raw);
        }
    }

    #[test]
    fn test_node_name_length_limit() {
        assert!(parse_argument("abcdefghij:x").unwrap().has_node);
        assert!(matches!(
            parse_argument("abcdefghijk:x"),
            Err(Error::Argument(_))
        ));
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in [
            "invalid:because:multiple:colons",
            "Invalid:becausenocapsinnodename",
            "1node:file",
        ] {
            match parse_argument(raw) {
                Err(Error::Argument(s)) => assert_eq!(s, raw),
                other => panic!("{raw}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_node_path() {
        let arg = parse_argument("node1:").unwrap();
        assert!(arg.has_node);
        assert_eq!(arg.file_path, "");
        assert!(!arg.exists_locally);
    }

    #[test]
    fn test_nul_byte_fails_local_inspection() {
        let result = parse_argument("node1:ud/\\/\\|\0[]*?");
        assert!(matches!(result, Err(Error::LocalPathCheck { .. })));
    }
}
