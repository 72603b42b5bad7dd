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

//! Copying files between the local host and a node.

pub mod argument;
pub mod plan;
pub mod transfer;

pub use argument::{parse_argument, CopyArgument};
pub use plan::{plan, Direction, TransferMode, TransferPlan};
pub use transfer::{copy_from, copy_to, execute_plan};
