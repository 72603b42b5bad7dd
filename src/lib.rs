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

//! Shell, command and file copy access to cluster nodes reached through
//! forwarded local SSH ports.

pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod copy;
pub mod error;
pub mod pty;
pub mod ssh;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
