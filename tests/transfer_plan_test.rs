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

//! Routing of parsed copy arguments to transfer plans.

use knode::copy::{parse_argument, plan, Direction, TransferMode};

#[test]
fn test_upload_file_plan() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.conf");
    std::fs::write(&file, "x=1").unwrap();

    let source = parse_argument(file.to_str().unwrap()).unwrap();
    let dest = parse_argument("node1:/etc/app").unwrap();

    let plan = plan(&source, &dest, false).unwrap();
    assert_eq!(plan.direction, Direction::ToNode);
    assert_eq!(plan.node, "node1");
    assert_eq!(plan.mode, TransferMode::File);
    assert_eq!(plan.source_path, file.to_str().unwrap());
    assert_eq!(plan.dest_path, "/etc/app");
}

#[test]
fn test_upload_directory_requires_recurse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    let source = parse_argument(path).unwrap();
    let dest = parse_argument("node1:").unwrap();

    let err = plan(&source, &dest, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("'{path}' is a directory. Use the --recurse option.")
    );
    assert_eq!(err.exit_code(), 1);

    let plan = plan(&source, &dest, true).unwrap();
    assert_eq!(plan.mode, TransferMode::Directory);
    assert_eq!(plan.dest_path, ".");
}

#[test]
fn test_missing_source_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let missing = missing.to_str().unwrap();

    let source = parse_argument(missing).unwrap();
    let dest = parse_argument("node1:/tmp").unwrap();

    let err = plan(&source, &dest, false).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("'{missing}': no such file or directory")
    );
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_download_plan() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("out");

    let source = parse_argument("node2:/var/log/app").unwrap();
    let dest = parse_argument(local.to_str().unwrap()).unwrap();

    let file_plan = plan(&source, &dest, false).unwrap();
    assert_eq!(file_plan.direction, Direction::FromNode);
    assert_eq!(file_plan.node, "node2");
    assert_eq!(file_plan.mode, TransferMode::File);

    let dir_plan = plan(&source, &dest, true).unwrap();
    assert_eq!(dir_plan.mode, TransferMode::Directory);
}

#[test]
fn test_node_pairs_rejected() {
    let a = parse_argument("node1:/a").unwrap();
    let b = parse_argument("node2:/b").unwrap();
    let err = plan(&a, &b, false).unwrap_err();
    assert_eq!(err.to_string(), "copying between nodes is not supported");

    let dir = tempfile::tempdir().unwrap();
    let local = parse_argument(dir.path().to_str().unwrap()).unwrap();
    let err = plan(&local, &local, true).unwrap_err();
    assert_eq!(err.to_string(), "must specify at least one node");
}
