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

//! File and directory copies between the local host and a node.

use std::path::Path;

use super::plan::{Direction, TransferMode, TransferPlan};
use crate::error::{Error, Result};
use crate::ssh::tokio_client::Client;
use crate::ssh::ClientConfig;

/// Copy a local file, or a local directory when `recursive` is set, to the node.
pub async fn copy_to(
    endpoint: &str,
    username: &str,
    password: &str,
    local: &str,
    remote: &str,
    recursive: bool,
) -> Result<()> {
    let config = ClientConfig::with_password(username, password);
    let client = connect(endpoint, &config).await?;

    let local_path = Path::new(local);
    let result = if recursive && local_path.is_dir() {
        tracing::debug!("Uploading directory {local} to {endpoint}:{remote}");
        client.upload_dir(local_path, remote).await
    } else {
        tracing::debug!("Uploading file {local} to {endpoint}:{remote}");
        client.upload_file(local_path, remote).await
    };

    finish(&client, result).await
}

/// Copy a remote file, or a remote directory when `recursive` is set, from the node.
pub async fn copy_from(
    endpoint: &str,
    username: &str,
    password: &str,
    remote: &str,
    local: &str,
    recursive: bool,
) -> Result<()> {
    let config = ClientConfig::with_password(username, password);
    let client = connect(endpoint, &config).await?;

    let local_path = Path::new(local);
    let result = if recursive {
        tracing::debug!("Downloading directory {endpoint}:{remote} to {local}");
        client.download_dir(remote, local_path).await
    } else {
        tracing::debug!("Downloading file {endpoint}:{remote} to {local}");
        client.download_file(remote, local_path).await
    };

    finish(&client, result).await
}

/// Carry out a validated plan against the node's SSH endpoint.
pub async fn execute_plan(
    plan: &TransferPlan,
    endpoint: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    let recursive = plan.mode == TransferMode::Directory;
    match plan.direction {
        Direction::ToNode => {
            copy_to(
                endpoint,
                username,
                password,
                &plan.source_path,
                &plan.dest_path,
                recursive,
            )
            .await
        }
        Direction::FromNode => {
            copy_from(
                endpoint,
                username,
                password,
                &plan.source_path,
                &plan.dest_path,
                recursive,
            )
            .await
        }
    }
}

async fn connect(endpoint: &str, config: &ClientConfig) -> Result<Client> {
    Client::connect(endpoint, config)
        .await
        .map_err(|e| Error::connection(endpoint, e))
}

async fn finish(
    client: &Client,
    result: std::result::Result<(), crate::ssh::tokio_client::Error>,
) -> Result<()> {
    if let Err(e) = client.disconnect().await {
        tracing::debug!("Disconnect from {} failed: {}", client.endpoint(), e);
    }
    result.map_err(Error::transfer)
}
