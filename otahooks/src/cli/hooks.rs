// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::atomic::AtomicBool,
};

use anyhow::{Context, Result};
use clap::{Args, Parser};
use zip::{ZipArchive, ZipWriter};

use crate::{
    cli::status,
    format::{
        edify,
        filesmap::{self, FilesMap},
        metadata,
        zip::ArchiveWriter,
    },
    hooks::{
        assertions,
        config::HookConfig,
        context::OtaInfo,
        radio::{self, MIN_API_VERSION},
    },
    util::{self, NumBytes},
};

type InputZip = ZipArchive<BufReader<File>>;
type OutputZip = ZipWriter<BufWriter<File>>;

fn load_config(group: &ConfigGroup) -> Result<HookConfig> {
    let mut config = match &group.config {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {path:?}"))?;
            HookConfig::from_toml(&data)
                .with_context(|| format!("Failed to parse config: {path:?}"))?
        }
        None => HookConfig::default(),
    };

    if let Some(dir) = &group.block_device_dir {
        config.block_device_dir.clone_from(dir);
    }

    Ok(config)
}

fn open_input(path: &Path) -> Result<InputZip> {
    let reader = File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open target files for reading: {path:?}"))?;
    let zip = ZipArchive::new(reader)
        .with_context(|| format!("Failed to read target files zip: {path:?}"))?;

    Ok(zip)
}

fn open_output(path: &Path) -> Result<OutputZip> {
    let writer = File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("Failed to open package for writing: {path:?}"))?;

    Ok(ZipWriter::new(writer))
}

/// Write the installer script and metadata collected by the hooks and
/// finalize the output package.
fn finish_package(info: OtaInfo<InputZip, OutputZip>, path: &Path) -> Result<()> {
    let (mut output_zip, script, metadata) = info.into_parts();

    output_zip
        .write_entry(edify::PATH_UPDATER_SCRIPT, script.to_script().as_bytes())
        .context("Failed to write installer script")?;

    let metadata_data =
        metadata::serialize_legacy(&metadata).context("Failed to serialize metadata")?;
    output_zip
        .write_entry(metadata::PATH_METADATA, metadata_data.as_bytes())
        .context("Failed to write metadata")?;

    let mut writer = output_zip
        .finish()
        .with_context(|| format!("Failed to finalize package: {path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush package: {path:?}"))?;

    status!("Wrote {} command(s) to {path:?}", script.lines().len());

    Ok(())
}

pub fn full_subcommand(cli: &FullCli, cancel_signal: &AtomicBool) -> Result<()> {
    let config = load_config(&cli.config)?;
    let input_zip = open_input(&cli.input)?;
    let output_zip = open_output(&cli.output)?;

    let mut info = OtaInfo::new_full(input_zip, output_zip, cli.api_version).with_config(config);

    if cli.skip_assertions {
        status!("Skipping baseband assertion");
    } else {
        status!("Checking baseband requirement");

        assertions::full_ota_assertions(&mut info, cancel_signal)
            .context("Failed to add baseband assertion")?;
    }

    status!("Adding radio images");

    radio::full_ota_install_end(&mut info, cancel_signal)
        .context("Failed to add radio images")?;

    finish_package(info, &cli.output)
}

pub fn incremental_subcommand(cli: &IncrementalCli, cancel_signal: &AtomicBool) -> Result<()> {
    let config = load_config(&cli.config)?;
    let source_zip = open_input(&cli.source)?;
    let target_zip = open_input(&cli.target)?;
    let output_zip = open_output(&cli.output)?;

    let mut info = OtaInfo::new_incremental(source_zip, target_zip, output_zip, cli.api_version)
        .with_config(config);

    if cli.skip_assertions {
        status!("Skipping baseband assertion");
    } else {
        status!("Checking baseband requirement");

        assertions::incremental_ota_assertions(&mut info, cancel_signal)
            .context("Failed to add baseband assertion")?;
    }

    radio::incremental_ota_install_end(&mut info).context("Failed to add radio images")?;

    finish_package(info, &cli.output)
}

fn display_filesmap(filesmap: &FilesMap) {
    for (name, entry) in filesmap {
        println!(
            "{name}: partition={}, sha1={}, size={:?}",
            entry.partition,
            entry.sha1,
            NumBytes(entry.size),
        );
    }
}

pub fn filesmap_subcommand(cli: &FilesmapCli, cancel_signal: &AtomicBool) -> Result<()> {
    let config = load_config(&cli.config)?;
    let mut input_zip = open_input(&cli.input)?;

    let filesmap = filesmap::load(&mut input_zip, &config.radio_dir, cancel_signal)
        .with_context(|| format!("Failed to load filesmap: {:?}", cli.input))?;

    display_filesmap(&filesmap);

    let radio_files = radio::get_radio_files(&input_zip, &config.radio_dir);

    for path in radio_files.keys() {
        let Some(name) = util::strip_dir(&config.radio_dir, path) else {
            continue;
        };

        if name != filesmap::NAME && !filesmap.contains_key(name) {
            status!("Not in filesmap, will not be flashed: {path}");
        }
    }

    Ok(())
}

#[derive(Debug, Args)]
pub struct ConfigGroup {
    /// Path to hook config TOML.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub config: Option<PathBuf>,

    /// Directory containing partition block devices on the device.
    ///
    /// This overrides the value from the config file.
    #[arg(long, value_name = "DIR")]
    pub block_device_dir: Option<String>,
}

/// Run the full OTA hooks.
///
/// The output zip will contain the radio images to flash, the installer script
/// commands emitted by the hooks, and the update metadata.
#[derive(Debug, Parser)]
pub struct FullCli {
    /// Path to input target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    /// Path to output package zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub output: PathBuf,

    /// Installer API version of the build.
    #[arg(long, value_name = "VERSION", default_value_t = MIN_API_VERSION)]
    pub api_version: u32,

    /// Do not check the baseband version.
    #[arg(long)]
    pub skip_assertions: bool,

    #[command(flatten)]
    pub config: ConfigGroup,
}

/// Run the incremental OTA hooks.
///
/// Radio images are never flashed by incremental OTAs.
#[derive(Debug, Parser)]
pub struct IncrementalCli {
    /// Path to source build target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub source: PathBuf,

    /// Path to target build target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub target: PathBuf,

    /// Path to output package zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub output: PathBuf,

    /// Installer API version of the target build.
    #[arg(long, value_name = "VERSION", default_value_t = MIN_API_VERSION)]
    pub api_version: u32,

    /// Do not check the baseband version.
    #[arg(long)]
    pub skip_assertions: bool,

    #[command(flatten)]
    pub config: ConfigGroup,
}

/// Show the radio images and where they will be flashed.
#[derive(Debug, Parser)]
pub struct FilesmapCli {
    /// Path to input target files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    #[command(flatten)]
    pub config: ConfigGroup,
}
