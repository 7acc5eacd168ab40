// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// A small wrapper to format a number as a size in bytes.
#[derive(Clone, Copy)]
pub struct NumBytes(pub u64);

impl fmt::Debug for NumBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "<{} byte>", self.0)
        } else {
            write!(f, "<{} bytes>", self.0)
        }
    }
}

/// Get the archive path prefix for a directory, including the trailing slash.
/// Archive paths always use `/` as the separator.
pub fn dir_prefix(dir: &str) -> String {
    format!("{}/", dir.trim_end_matches('/'))
}

/// Join an archive directory and a file name.
pub fn entry_path(dir: &str, name: &str) -> String {
    let mut path = dir_prefix(dir);
    path.push_str(name);
    path
}

/// Strip an archive directory from a path. Returns [`None`] if the path is not
/// strictly inside the directory.
pub fn strip_dir<'a>(dir: &str, path: &'a str) -> Option<&'a str> {
    path.strip_prefix(&dir_prefix(dir))
        .filter(|name| !name.is_empty())
}
