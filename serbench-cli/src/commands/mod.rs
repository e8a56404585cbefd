// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

pub mod list;
pub mod run;
pub mod worker;

use serbench_core::{DriverConfig, TargetKey};
use serde::{Deserialize, Serialize};

/// Wire format between the parent process and an isolated worker: one
/// target key plus the driver timing configuration, passed as JSON on the
/// command line. The worker answers with one JSON `TargetReport` on
/// stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSpec {
    pub key: TargetKey,
    pub driver: DriverConfig,
}
