// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::{collections::BTreeMap, fmt::Write};

use thiserror::Error;

pub const PATH_METADATA: &str = "META-INF/com/android/metadata";

/// Baseband version(s) the device must be running before the update.
pub const KEY_PRE_BASEBAND: &str = "pre-baseband";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid metadata line: {0:?}")]
    InvalidLine(String),
    #[error("Invalid metadata key: {0:?}")]
    InvalidKey(String),
}

type Result<T> = std::result::Result<T, Error>;

/// Update metadata collected while building the package.
pub type Metadata = BTreeMap<String, String>;

/// Serialize metadata to the legacy plain-text `key=value` format. Keys are
/// written in sorted order.
pub fn serialize_legacy(metadata: &Metadata) -> Result<String> {
    let mut result = String::new();

    for (key, value) in metadata {
        if key.is_empty() || key.contains(['=', '\n']) {
            return Err(Error::InvalidKey(key.clone()));
        } else if value.contains('\n') {
            return Err(Error::InvalidLine(format!("{key}={value}")));
        }

        writeln!(result, "{key}={value}").expect("Writing to String cannot fail");
    }

    Ok(result)
}

/// Parse the legacy plain-text `key=value` format.
pub fn parse_legacy(data: &str) -> Result<Metadata> {
    let mut metadata = Metadata::new();

    for line in data.split('\n') {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| Error::InvalidLine(line.to_owned()))?;

        metadata.insert(key.to_owned(), value.to_owned());
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn serialize_sorted() {
        let mut metadata = Metadata::new();
        metadata.insert("pre-device".to_owned(), "msm8916".to_owned());
        metadata.insert(KEY_PRE_BASEBAND.to_owned(), "1|2|*".to_owned());

        let data = serialize_legacy(&metadata).unwrap();
        assert_eq!(data, "pre-baseband=1|2|*\npre-device=msm8916\n");
        assert_eq!(parse_legacy(&data).unwrap(), metadata);
    }

    #[test]
    fn serialize_invalid() {
        let mut metadata = Metadata::new();
        metadata.insert("a=b".to_owned(), "c".to_owned());
        assert_matches!(serialize_legacy(&metadata), Err(Error::InvalidKey(_)));

        let mut metadata = Metadata::new();
        metadata.insert("a".to_owned(), "b\nc".to_owned());
        assert_matches!(serialize_legacy(&metadata), Err(Error::InvalidLine(_)));
    }

    #[test]
    fn parse_invalid() {
        assert_matches!(parse_legacy("no separator\n"), Err(Error::InvalidLine(_)));
    }
}
