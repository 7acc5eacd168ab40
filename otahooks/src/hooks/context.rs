// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::AtomicBool;

use crate::{
    format::{
        edify::EdifyScript,
        filesmap::{self, FilesMap},
        metadata::Metadata,
        zip::{ArchiveReader, ArchiveWriter},
    },
    hooks::config::HookConfig,
};

/// Which archive a hook should inspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveSource {
    Input,
    Target,
}

/// State shared with the hooks while an OTA package is being built. The hooks
/// only ever append to the script, metadata, and output archive.
pub struct OtaInfo<R, W> {
    /// Target files being packaged. For incremental OTAs, this is the source
    /// build.
    pub input_zip: R,
    /// Target files of the build being updated to. Only set for incremental
    /// OTAs.
    pub target_zip: Option<R>,
    pub output_zip: W,
    pub script: EdifyScript,
    pub metadata: Metadata,
    /// Installer API version of the build being installed.
    pub input_version: u32,
    pub config: HookConfig,
    input_filesmap: Option<FilesMap>,
}

impl<R: ArchiveReader, W: ArchiveWriter> OtaInfo<R, W> {
    pub fn new_full(input_zip: R, output_zip: W, input_version: u32) -> Self {
        Self {
            input_zip,
            target_zip: None,
            output_zip,
            script: EdifyScript::new(),
            metadata: Metadata::new(),
            input_version,
            config: HookConfig::default(),
            input_filesmap: None,
        }
    }

    pub fn new_incremental(
        source_zip: R,
        target_zip: R,
        output_zip: W,
        target_version: u32,
    ) -> Self {
        Self {
            target_zip: Some(target_zip),
            ..Self::new_full(source_zip, output_zip, target_version)
        }
    }

    pub fn with_config(mut self, config: HookConfig) -> Self {
        self.config = config;
        self.input_filesmap = None;
        self
    }

    /// Load the filesmap of the input archive. It is loaded on first use and
    /// then reused so that each radio image is only hashed once per package.
    pub fn input_filesmap(
        &mut self,
        cancel_signal: &AtomicBool,
    ) -> Result<&FilesMap, filesmap::Error> {
        let filesmap = match self.input_filesmap.take() {
            Some(f) => f,
            None => filesmap::load(&mut self.input_zip, &self.config.radio_dir, cancel_signal)?,
        };

        Ok(self.input_filesmap.insert(filesmap))
    }

    pub fn is_incremental(&self) -> bool {
        self.target_zip.is_some()
    }

    pub fn into_parts(self) -> (W, EdifyScript, Metadata) {
        (self.output_zip, self.script, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Cursor, sync::atomic::AtomicBool};

    use zip::{ZipArchive, ZipWriter};

    use super::*;

    type TestInfo = OtaInfo<ZipArchive<Cursor<Vec<u8>>>, ZipWriter<Cursor<Vec<u8>>>>;

    fn build_archive(entries: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, data) in entries {
            writer.write_entry(name, data).unwrap();
        }

        let raw_writer = writer.finish().unwrap();

        ZipArchive::new(Cursor::new(raw_writer.into_inner())).unwrap()
    }

    #[test]
    fn input_filesmap_is_cached() {
        let mut info = TestInfo::new_full(
            build_archive(&[
                ("RADIO/filesmap", b"NON-HLOS.bin modem\n"),
                ("RADIO/NON-HLOS.bin", b"modem"),
            ]),
            ZipWriter::new(Cursor::new(Vec::new())),
            3,
        );

        let first = info.input_filesmap(&AtomicBool::new(false)).unwrap().clone();
        assert_eq!(first["NON-HLOS.bin"].size, 5);

        // Hashing would fail if the images were read again.
        let cancel_signal = AtomicBool::new(true);
        assert_eq!(info.input_filesmap(&cancel_signal).unwrap(), &first);
    }
}
