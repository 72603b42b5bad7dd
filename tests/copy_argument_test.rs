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

//! Copy argument classification against a real working directory.

use knode::copy::parse_argument;
use knode::Error;
use serial_test::serial;
use std::path::PathBuf;

/// Runs the test body inside a fresh temporary working directory.
struct WorkDir {
    _dir: tempfile::TempDir,
    previous: PathBuf,
}

impl WorkDir {
    fn enter() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        std::fs::write("testfile.tmp", b"test").unwrap();
        std::fs::create_dir("testdir").unwrap();

        Self { _dir: dir, previous }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

#[test]
#[serial]
fn test_plain_and_prefixed_arguments() {
    let _wd = WorkDir::enter();

    let arg = parse_argument("justafile").unwrap();
    assert!(!arg.has_node);
    assert!(!arg.exists_locally);

    let arg = parse_argument("node1:file1").unwrap();
    assert!(arg.has_node);
    assert_eq!(arg.node_name.as_deref(), Some("node1"));
    assert_eq!(arg.file_path, "file1");

    for raw in ["c:file1", "C:file1"] {
        let arg = parse_argument(raw).unwrap();
        assert!(arg.is_windows_path);
        assert_eq!(arg.file_path, raw);
    }
}

#[test]
#[serial]
fn test_malformed_arguments() {
    let _wd = WorkDir::enter();

    for raw in [
        "invalid:because:multiple:colons",
        "Invalid:becausenocapsinnodename",
    ] {
        let err = parse_argument(raw).unwrap_err();
        assert_eq!(err.to_string(), format!("could not understand '{raw}'"));
        assert_eq!(err.exit_code(), 1);
    }
}

#[test]
#[serial]
fn test_node_argument_inspects_local_path() {
    let _wd = WorkDir::enter();

    let file = parse_argument("node1:testfile.tmp").unwrap();
    assert!(file.exists_locally);
    assert!(!file.is_local_directory);

    let dir = parse_argument("node1:testdir").unwrap();
    assert!(dir.exists_locally);
    assert!(dir.is_local_directory);

    let local = parse_argument("testdir").unwrap();
    assert!(!local.has_node);
    assert!(local.is_local_directory);
}

#[test]
#[serial]
fn test_invalid_local_path_is_error() {
    let _wd = WorkDir::enter();

    let result = parse_argument("node1:ud/\\/\\|\0[]*?");
    assert!(matches!(result, Err(Error::LocalPathCheck { .. })));
}
