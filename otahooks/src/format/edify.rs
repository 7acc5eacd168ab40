// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

//! Builder for the edify installer scripts interpreted by recovery. Only the
//! commands needed by the device hooks are implemented.

use std::collections::BTreeSet;

/// Path of the installer script inside an OTA package.
pub const PATH_UPDATER_SCRIPT: &str = "META-INF/com/google/android/updater-script";

/// Escape a string for use inside a double-quoted edify string literal.
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => result.push_str(r"\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str(r"\n"),
            c => result.push(c),
        }
    }

    result
}

#[derive(Clone, Debug, Default)]
pub struct EdifyScript {
    lines: Vec<String>,
    mounts: BTreeSet<String>,
}

impl EdifyScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the installation unless `ro.baseband` matches one of the listed
    /// values.
    pub fn assert_some_baseband(&mut self, basebands: &[&str]) {
        let conditions = basebands
            .iter()
            .map(|b| format!("getprop(\"ro.baseband\") == \"{}\"", escape(b)))
            .collect::<Vec<_>>()
            .join(" || ");

        self.lines.push(format!("assert({conditions});"));
    }

    /// Record a mount point so that [`Self::unmount_all`] knows to unmount
    /// it.
    pub fn mount(&mut self, mount_point: &str) {
        if self.mounts.insert(mount_point.to_owned()) {
            self.lines
                .push(format!("mount(\"{}\");", escape(mount_point)));
        }
    }

    /// Unmount every mount point recorded by [`Self::mount`]. Partitions
    /// mounted by other parts of the installer script are not tracked here,
    /// so nothing is emitted if this builder never mounted anything.
    pub fn unmount_all(&mut self) {
        for mount_point in std::mem::take(&mut self.mounts) {
            self.lines
                .push(format!("unmount(\"{}\");", escape(&mount_point)));
        }
    }

    pub fn print(&mut self, message: &str) {
        self.lines.push(format!("ui_print(\"{}\");", escape(message)));
    }

    /// Append a raw command. The caller is responsible for escaping.
    pub fn append_extra(&mut self, command: impl Into<String>) {
        self.lines.push(command.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_script(&self) -> String {
        let mut script = self.lines.join("\n");
        script.push('\n');
        script
    }
}
