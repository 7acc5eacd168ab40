// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::{collections::BTreeMap, sync::atomic::AtomicBool};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    format::{
        edify,
        filesmap::{self, FilesMap, FilesMapEntry},
        zip::{ArchiveReader, ArchiveWriter},
    },
    hooks::context::OtaInfo,
    stream, util,
};

/// Oldest installer API version with `sha1_check` and `read_file`, which are
/// needed to skip flashing images that are already up to date.
pub const MIN_API_VERSION: u32 = 3;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Radio image disappeared from target files: {0}")]
    MissingImage(String),
    #[error("Failed to load filesmap")]
    FilesMap(#[from] filesmap::Error),
    #[error("Archive error")]
    Archive(#[from] crate::format::zip::Error),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Archive paths of radio images, mapped to themselves.
pub type RadioFiles = BTreeMap<String, String>;

/// What [`install_radio`] did with an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The image has no filesmap entry.
    Skipped,
    /// The installer is too old for checksum-guarded flashing.
    Unsupported,
    Installed,
}

/// Find all files strictly inside the radio directory.
pub fn get_radio_files(archive: &impl ArchiveReader, radio_dir: &str) -> RadioFiles {
    archive
        .entry_names()
        .into_iter()
        .filter(|path| !path.ends_with('/'))
        .filter(|path| util::strip_dir(radio_dir, path).is_some())
        .map(|path| (path.clone(), path))
        .collect()
}

/// Build the command that flashes `name` to `partition` only if the partition
/// does not already contain the expected data. `read_file` returns a blob or
/// NULL and `sha1_check` turns that into a string that can be compared, with
/// NULL becoming the empty string.
fn flash_command(block_device: &str, entry: &FilesMapEntry, name: &str) -> String {
    format!(
        "ifelse((sha1_check(read_file(\"EMMC:{}:{}:{}\")) != \"\"),\
         (ui_print(\"{}\")),\
         (package_extract_file(\"{}\", \"{}\")));",
        edify::escape(block_device),
        entry.size,
        entry.sha1,
        edify::escape(&format!("{} already up to date", entry.partition)),
        edify::escape(name),
        edify::escape(block_device),
    )
}

/// Emit the commands to flash a single radio image and add the image to the
/// output package. `path` is the image's path in target files.
pub fn install_radio<R: ArchiveReader, W: ArchiveWriter>(
    radio_img: &[u8],
    api_version: u32,
    filesmap: &FilesMap,
    path: &str,
    info: &mut OtaInfo<R, W>,
) -> Result<InstallOutcome> {
    let name = util::strip_dir(&info.config.radio_dir, path).unwrap_or(path);

    let Some(entry) = filesmap.get(name) else {
        debug!("Radio image not in filesmap: {name}");
        return Ok(InstallOutcome::Skipped);
    };

    if api_version < MIN_API_VERSION {
        warn!("Radio update: no support for api_version less than {MIN_API_VERSION}");
        return Ok(InstallOutcome::Unsupported);
    }

    info.output_zip.write_entry(name, radio_img)?;

    let block_device = info.config.block_device(&entry.partition);
    info.script
        .append_extra(flash_command(&block_device, entry, name));

    info!("Flashing {name} to {}", entry.partition);

    Ok(InstallOutcome::Installed)
}

/// Flash every radio image that has a filesmap entry. Before any image is
/// written, the mount points recorded in the script builder are unmounted.
pub fn full_ota_install_end<R: ArchiveReader, W: ArchiveWriter>(
    info: &mut OtaInfo<R, W>,
    cancel_signal: &AtomicBool,
) -> Result<()> {
    let files = get_radio_files(&info.input_zip, &info.config.radio_dir);
    if files.is_empty() {
        warn!("Radio update: no radio image in input target files; not flashing radio");
        return Ok(());
    }

    info.script.unmount_all();
    info.script.print("Writing radio image...");

    let filesmap = info.input_filesmap(cancel_signal)?.clone();
    if filesmap.is_empty() {
        warn!("Radio update: no or invalid filesmap file found; not flashing radio");
        return Ok(());
    }

    for path in files.keys() {
        stream::check_cancel(cancel_signal)?;

        // Unmapped images, including the filesmap itself, are never read.
        let name = util::strip_dir(&info.config.radio_dir, path).unwrap_or(path);
        if !filesmap.contains_key(name) {
            debug!("Radio image not in filesmap: {name}");
            continue;
        }

        let radio_img = info
            .input_zip
            .read_entry(path)?
            .ok_or_else(|| Error::MissingImage(path.clone()))?;

        install_radio(&radio_img, info.input_version, &filesmap, path, info)?;
    }

    Ok(())
}

pub fn incremental_ota_install_end<R: ArchiveReader, W: ArchiveWriter>(
    _info: &mut OtaInfo<R, W>,
) -> Result<()> {
    // TODO: Diff radio images between the source and target builds and flash
    // the ones that changed.
    warn!("Radio update: radio update for incremental OTA is not supported");

    Ok(())
}
