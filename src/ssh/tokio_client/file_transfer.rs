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

//! SFTP file transfer operations.
//!
//! Single files and whole directory trees can be copied in either direction.
//! Destinations follow scp conventions: copying onto an existing directory
//! places the source inside it under its own name.

use russh_sftp::{client::SftpSession, protocol::OpenFlags};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncWriteExt;

use super::connection::Client;
use super::Error;

type BoxedTransfer<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

impl Client {
    /// Start an SFTP session on a fresh channel.
    ///
    /// The remote sshd must have the sftp subsystem enabled.
    async fn open_sftp(&self) -> Result<SftpSession, Error> {
        let channel = self.get_channel().await?;
        channel.request_subsystem(true, "sftp").await?;
        Ok(SftpSession::new(channel.into_stream()).await?)
    }

    /// Upload a single local file.
    pub async fn upload_file(&self, local_path: &Path, remote_path: &str) -> Result<(), Error> {
        let sftp = self.open_sftp().await?;

        let target = if remote_is_dir(&sftp, remote_path).await {
            join_remote(remote_path, &local_name(local_path)?)
        } else {
            remote_path.to_string()
        };

        tracing::debug!("Uploading {:?} to {}", local_path, target);
        upload_one(&sftp, local_path, &target).await
    }

    /// Download a single remote file.
    pub async fn download_file(&self, remote_path: &str, local_path: &Path) -> Result<(), Error> {
        let sftp = self.open_sftp().await?;

        let target = if local_path.is_dir() {
            local_path.join(remote_name(remote_path))
        } else {
            local_path.to_path_buf()
        };

        tracing::debug!("Downloading {} to {:?}", remote_path, target);
        download_one(&sftp, remote_path, &target).await
    }

    /// Upload a local directory tree.
    pub async fn upload_dir(&self, local_dir: &Path, remote_dir: &str) -> Result<(), Error> {
        if !local_dir.is_dir() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("local directory does not exist: {}", local_dir.display()),
            )));
        }

        let sftp = self.open_sftp().await?;

        let target = if remote_is_dir(&sftp, remote_dir).await {
            join_remote(remote_dir, &local_name(local_dir)?)
        } else {
            remote_dir.to_string()
        };

        ensure_remote_dir(&sftp, &target).await?;

        tracing::debug!("Uploading directory {:?} to {}", local_dir, target);
        upload_tree(&sftp, local_dir.to_path_buf(), target).await
    }

    /// Download a remote directory tree.
    pub async fn download_dir(&self, remote_dir: &str, local_dir: &Path) -> Result<(), Error> {
        let sftp = self.open_sftp().await?;

        let target = if local_dir.is_dir() {
            local_dir.join(remote_name(remote_dir))
        } else {
            local_dir.to_path_buf()
        };

        tokio::fs::create_dir_all(&target).await?;

        tracing::debug!("Downloading directory {} to {:?}", remote_dir, target);
        download_tree(&sftp, remote_dir.to_string(), target).await
    }
}

async fn remote_is_dir(sftp: &SftpSession, path: &str) -> bool {
    sftp.metadata(path)
        .await
        .map(|metadata| metadata.file_type().is_dir())
        .unwrap_or(false)
}

/// Create a remote directory. A directory already at `path` is fine.
async fn ensure_remote_dir(sftp: &SftpSession, path: &str) -> Result<(), Error> {
    match sftp.create_dir(path).await {
        Ok(()) => Ok(()),
        Err(_) if remote_is_dir(sftp, path).await => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn upload_one(sftp: &SftpSession, local_path: &Path, remote_path: &str) -> Result<(), Error> {
    let mut local_file = tokio::fs::File::open(local_path).await?;
    let mut remote_file = sftp
        .open_with_flags(
            remote_path,
            OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
        )
        .await?;

    tokio::io::copy(&mut local_file, &mut remote_file).await?;
    remote_file.flush().await?;
    remote_file.shutdown().await?;
    Ok(())
}

async fn download_one(sftp: &SftpSession, remote_path: &str, local_path: &Path) -> Result<(), Error> {
    let mut remote_file = sftp.open_with_flags(remote_path, OpenFlags::READ).await?;
    let mut local_file = tokio::fs::File::create(local_path).await?;

    tokio::io::copy(&mut remote_file, &mut local_file).await?;
    local_file.flush().await?;
    Ok(())
}

fn upload_tree(sftp: &SftpSession, local_dir: PathBuf, remote_dir: String) -> BoxedTransfer<'_> {
    Box::pin(async move {
        let mut entries = tokio::fs::read_dir(&local_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let remote_path = join_remote(&remote_dir, &entry.file_name().to_string_lossy());
            let metadata = entry.metadata().await?;

            if metadata.is_dir() {
                ensure_remote_dir(sftp, &remote_path).await?;
                upload_tree(sftp, path, remote_path).await?;
            } else if metadata.is_file() {
                upload_one(sftp, &path, &remote_path).await?;
            } else {
                tracing::debug!("Skipping special file {:?}", path);
            }
        }

        Ok(())
    })
}

fn download_tree(sftp: &SftpSession, remote_dir: String, local_dir: PathBuf) -> BoxedTransfer<'_> {
    Box::pin(async move {
        let entries = sftp.read_dir(&remote_dir).await?;

        for entry in entries {
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }

            let remote_path = join_remote(&remote_dir, &name);
            let local_path = local_dir.join(&name);
            let file_type = entry.metadata().file_type();

            if file_type.is_dir() {
                tokio::fs::create_dir_all(&local_path).await?;
                download_tree(sftp, remote_path, local_path).await?;
            } else if file_type.is_file() {
                download_one(sftp, &remote_path, &local_path).await?;
            } else {
                tracing::debug!("Skipping special remote file {}", remote_path);
            }
        }

        Ok(())
    })
}

/// Join a remote directory and an entry name with a forward slash.
pub(crate) fn join_remote(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Last component of a remote path, ignoring trailing slashes.
pub(crate) fn remote_name(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => trimmed.to_string(),
    }
}

fn local_name(path: &Path) -> Result<String, Error> {
    let resolved = if path.file_name().is_none() {
        std::fs::canonicalize(path)?
    } else {
        path.to_path_buf()
    };

    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot determine a file name for {}", path.display()),
            ))
        })
}
