// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::format::androidinfo;

/// Device-specific paths used by the hooks. The defaults match the standard
/// target files layout.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HookConfig {
    /// Directory in target files containing radio images and the filesmap.
    pub radio_dir: String,
    /// Path to the device info file in target files.
    pub android_info: String,
    /// Directory on the device containing partition block device nodes.
    pub block_device_dir: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            radio_dir: "RADIO".to_owned(),
            android_info: androidinfo::PATH_ANDROID_INFO.to_owned(),
            block_device_dir: "/dev/block/bootdevice/by-name".to_owned(),
        }
    }
}

impl HookConfig {
    pub fn from_toml(data: &str) -> Result<Self, toml_edit::de::Error> {
        toml_edit::de::from_str(data)
    }

    /// Path to the block device for a partition on the device. Partitions
    /// given as absolute device paths are used as is.
    pub fn block_device(&self, partition: &str) -> String {
        if partition.starts_with('/') {
            return partition.to_owned();
        }

        format!("{}/{partition}", self.block_device_dir.trim_end_matches('/'))
    }
}
