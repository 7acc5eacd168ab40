// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::AtomicBool;

use thiserror::Error;
use tracing::debug;

use crate::{
    format::{
        androidinfo, filesmap,
        metadata::KEY_PRE_BASEBAND,
        zip::{ArchiveReader, ArchiveWriter},
    },
    hooks::context::{ArchiveSource, OtaInfo},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing entry in target files: {0}")]
    MissingDeviceInfo(String),
    #[error("Failed to load filesmap")]
    FilesMap(#[from] filesmap::Error),
    #[error("Archive error")]
    Archive(#[from] crate::format::zip::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Assert that the device's baseband matches what the build requires, unless
/// the build packages its own firmware. The requirement, if any, is recorded
/// in the metadata as `pre-baseband`.
pub fn add_baseband_assertion<R: ArchiveReader, W: ArchiveWriter>(
    info: &mut OtaInfo<R, W>,
    source: ArchiveSource,
    cancel_signal: &AtomicBool,
) -> Result<()> {
    let target_zip = info
        .target_zip
        .as_mut()
        .filter(|_| source == ArchiveSource::Target);

    // Presence of a filesmap indicates packaged firmware.
    let packaged = if let Some(target_zip) = target_zip {
        !filesmap::load(target_zip, &info.config.radio_dir, cancel_signal)?.is_empty()
    } else {
        !info.input_filesmap(cancel_signal)?.is_empty()
    };
    if packaged {
        debug!("Skipping baseband assertion for packaged firmware");
        return Ok(());
    }

    let archive = match source {
        ArchiveSource::Input => &mut info.input_zip,
        ArchiveSource::Target => info.target_zip.as_mut().unwrap_or(&mut info.input_zip),
    };

    let path = &info.config.android_info;
    let data = archive
        .read_entry(path)?
        .ok_or_else(|| Error::MissingDeviceInfo(path.clone()))?;
    let data = String::from_utf8_lossy(&data);

    let Some(requirement) = androidinfo::find_baseband_requirement(&data) else {
        debug!("No baseband requirement in {path}");
        return Ok(());
    };

    if !requirement.is_wildcard() {
        info.script
            .assert_some_baseband(&requirement.alternatives());
    }

    info.metadata
        .insert(KEY_PRE_BASEBAND.to_owned(), requirement.raw().to_owned());

    Ok(())
}

pub fn full_ota_assertions<R: ArchiveReader, W: ArchiveWriter>(
    info: &mut OtaInfo<R, W>,
    cancel_signal: &AtomicBool,
) -> Result<()> {
    add_baseband_assertion(info, ArchiveSource::Input, cancel_signal)
}

pub fn incremental_ota_assertions<R: ArchiveReader, W: ArchiveWriter>(
    info: &mut OtaInfo<R, W>,
    cancel_signal: &AtomicBool,
) -> Result<()> {
    add_baseband_assertion(info, ArchiveSource::Target, cancel_signal)
}
