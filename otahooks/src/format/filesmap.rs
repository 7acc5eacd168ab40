// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

//! The filesmap manifest maps each packaged radio firmware image to the
//! partition it should be flashed to. Each line has the form:
//!
//! ```text
//! <filename> <partition> [<extra>]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. The manifest itself
//! carries no checksums. Those are computed from the images in the archive
//! when the manifest is loaded.

use std::{collections::BTreeMap, io, sync::atomic::AtomicBool};

use ring::digest::{Context, SHA1_FOR_LEGACY_USE_ONLY};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    format::zip::{self, ArchiveReader},
    stream::{self, HashingReader},
    util::{self, NumBytes},
};

/// Name of the manifest inside the radio directory.
pub const NAME: &str = "filesmap";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed filesmap line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },
    #[error("Filesmap references missing image: {0}")]
    MissingImage(String),
    #[error("Failed to hash image: {0}")]
    HashImage(String, #[source] io::Error),
    #[error("Archive error")]
    Archive(#[from] zip::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// A single parsed manifest line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilesMapLine<'a> {
    pub filename: &'a str,
    pub partition: &'a str,
    pub extra: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilesMapEntry {
    /// Destination partition name.
    pub partition: String,
    /// Lowercase hex SHA-1 digest of the image.
    pub sha1: String,
    /// Image size in bytes.
    pub size: u64,
}

/// Image file name (relative to the radio directory) to entry.
pub type FilesMap = BTreeMap<String, FilesMapEntry>;

/// Parse the manifest text. Fails on the first line that does not have 2 or 3
/// fields.
pub fn parse(data: &str) -> Result<Vec<FilesMapLine<'_>>> {
    let mut result = vec![];

    for (index, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let pieces = line.split_whitespace().collect::<Vec<_>>();
        let (filename, partition, extra) = match pieces[..] {
            [f, p] => (f, p, None),
            [f, p, e] => (f, p, Some(e)),
            _ => {
                return Err(Error::MalformedLine {
                    line: index + 1,
                    text: line.to_owned(),
                });
            }
        };

        result.push(FilesMapLine {
            filename,
            partition,
            extra,
        });
    }

    Ok(result)
}

/// Compute the size and hex SHA-1 digest of an archive entry.
fn hash_entry(
    archive: &mut impl ArchiveReader,
    path: &str,
    cancel_signal: &AtomicBool,
) -> Result<(u64, String)> {
    let size = archive
        .entry_size(path)?
        .ok_or_else(|| Error::MissingImage(path.to_owned()))?;
    let reader = archive
        .open_entry(path)?
        .ok_or_else(|| Error::MissingImage(path.to_owned()))?;

    let mut hashing_reader = HashingReader::new(reader, Context::new(&SHA1_FOR_LEGACY_USE_ONLY));
    stream::copy(&mut hashing_reader, io::sink(), cancel_signal)
        .map_err(|e| Error::HashImage(path.to_owned(), e))?;

    let (_, context) = hashing_reader.finish();
    let digest = hex::encode(context.finish());

    Ok((size, digest))
}

/// Load the filesmap from `<radio_dir>/filesmap` in the archive. If the
/// manifest does not exist, an empty map is returned, which callers should
/// treat as the archive having no packaged firmware metadata.
pub fn load(
    archive: &mut impl ArchiveReader,
    radio_dir: &str,
    cancel_signal: &AtomicBool,
) -> Result<FilesMap> {
    let path = util::entry_path(radio_dir, NAME);

    let Some(data) = archive.read_entry(&path)? else {
        warn!("Could not find {path} in target files");
        return Ok(FilesMap::new());
    };
    let data = String::from_utf8_lossy(&data);

    let lines = parse(&data)?;
    let mut filesmap = FilesMap::new();

    for line in lines {
        let image_path = util::entry_path(radio_dir, line.filename);
        let (size, sha1) = hash_entry(archive, &image_path, cancel_signal)?;

        debug!(
            "Filesmap entry: {} -> {} ({sha1}, {:?})",
            line.filename,
            line.partition,
            NumBytes(size),
        );

        filesmap.insert(
            line.filename.to_owned(),
            FilesMapEntry {
                partition: line.partition.to_owned(),
                sha1,
                size,
            },
        );
    }

    Ok(filesmap)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_valid_lines() {
        let lines = parse(
            "# comment\n\
             \n\
             NON-HLOS.bin modem\n\
             \t  tz.mbn  tz   0x1000 \n\
             #sbl1.mbn sbl1\n",
        )
        .unwrap();

        assert_eq!(
            lines,
            [
                FilesMapLine {
                    filename: "NON-HLOS.bin",
                    partition: "modem",
                    extra: None,
                },
                FilesMapLine {
                    filename: "tz.mbn",
                    partition: "tz",
                    extra: Some("0x1000"),
                },
            ],
        );
    }

    #[test]
    fn parse_empty() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n# nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn parse_wrong_field_count() {
        assert_matches!(
            parse("modem.img modem\nrpm.mbn\n"),
            Err(Error::MalformedLine { line: 2, text }) if text == "rpm.mbn"
        );
        assert_matches!(
            parse("modem.img modem a b"),
            Err(Error::MalformedLine { line: 1, .. })
        );
    }
}
