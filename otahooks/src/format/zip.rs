// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Read, Seek, Write};

use thiserror::Error;
use zip::{
    CompressionMethod, DateTime, ZipArchive, ZipWriter,
    result::ZipError,
    write::SimpleFileOptions,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open zip entry: {0}")]
    OpenEntry(String, #[source] ZipError),
    #[error("Failed to read zip entry: {0}")]
    ReadEntry(String, #[source] io::Error),
    #[error("Failed to begin new zip entry: {0}")]
    StartEntry(String, #[source] ZipError),
    #[error("Failed to write zip entry: {0}")]
    WriteEntry(String, #[source] io::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Read access to a target-files style archive. Missing entries are reported
/// as [`None`] rather than as errors so that callers can decide whether the
/// absence is meaningful.
pub trait ArchiveReader {
    /// List all entry names, including directory entries.
    fn entry_names(&self) -> Vec<String>;

    /// Get the uncompressed size of an entry as recorded in the central
    /// directory.
    fn entry_size(&mut self, name: &str) -> Result<Option<u64>>;

    /// Open an entry for reading its uncompressed contents.
    fn open_entry(&mut self, name: &str) -> Result<Option<Box<dyn Read + '_>>>;

    /// Read an entry's full contents into memory.
    fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let Some(mut reader) = self.open_entry(name)? else {
            return Ok(None);
        };

        let mut data = vec![];
        reader
            .read_to_end(&mut data)
            .map_err(|e| Error::ReadEntry(name.to_owned(), e))?;

        Ok(Some(data))
    }
}

/// Write access to an output package archive.
pub trait ArchiveWriter {
    /// Add a new entry with the specified contents.
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

impl<R: Read + Seek> ArchiveReader for ZipArchive<R> {
    fn entry_names(&self) -> Vec<String> {
        self.file_names().map(|n| n.to_owned()).collect()
    }

    fn entry_size(&mut self, name: &str) -> Result<Option<u64>> {
        match self.by_name(name) {
            Ok(entry) => Ok(Some(entry.size())),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(Error::OpenEntry(name.to_owned(), e)),
        }
    }

    fn open_entry(&mut self, name: &str) -> Result<Option<Box<dyn Read + '_>>> {
        match self.by_name(name) {
            Ok(entry) => Ok(Some(Box::new(entry))),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(Error::OpenEntry(name.to_owned(), e)),
        }
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipWriter<W> {
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        // Fixed timestamps keep the output reproducible.
        let options = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .compression_method(CompressionMethod::Deflated);

        self.start_file(name, options)
            .map_err(|e| Error::StartEntry(name.to_owned(), e))?;
        self.write_all(data)
            .map_err(|e| Error::WriteEntry(name.to_owned(), e))?;

        Ok(())
    }
}
