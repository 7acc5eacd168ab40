// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::{self, File},
    io::Read,
    path::Path,
    sync::atomic::AtomicBool,
};

use otahooks::{
    cli::hooks::{self, ConfigGroup, FullCli, IncrementalCli},
    format::{edify, metadata, zip::ArchiveWriter},
};
use tempfile::TempDir;
use zip::{ZipArchive, ZipWriter};

fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);

    for (name, data) in entries {
        writer.write_entry(name, data).unwrap();
    }

    writer.finish().unwrap();
}

fn read_entry(path: &Path, name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).ok()?;
    let mut data = vec![];
    entry.read_to_end(&mut data).unwrap();

    Some(data)
}

fn no_config() -> ConfigGroup {
    ConfigGroup {
        config: None,
        block_device_dir: None,
    }
}

#[test]
fn full_package() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("target_files.zip");
    let output = temp_dir.path().join("ota.zip");
    let config = temp_dir.path().join("hooks.toml");

    write_archive(
        &input,
        &[
            ("OTA/android-info.txt", b"require version-baseband=1.0|2.0\n"),
            ("FIRMWARE/filesmap", b"NON-HLOS.bin modem\n"),
            ("FIRMWARE/NON-HLOS.bin", b"modem firmware"),
        ],
    );
    fs::write(&config, "radio_dir = \"FIRMWARE\"\n").unwrap();

    let cli = FullCli {
        input,
        output: output.clone(),
        api_version: 3,
        skip_assertions: false,
        config: ConfigGroup {
            config: Some(config),
            block_device_dir: Some("/dev/block/by-name".to_owned()),
        },
    };
    let cancel_signal = AtomicBool::new(false);

    hooks::full_subcommand(&cli, &cancel_signal).unwrap();

    assert_eq!(
        read_entry(&output, "NON-HLOS.bin").as_deref(),
        Some(&b"modem firmware"[..]),
    );

    let script = read_entry(&output, edify::PATH_UPDATER_SCRIPT).unwrap();
    let script = String::from_utf8(script).unwrap();
    assert!(script.starts_with("ui_print(\"Writing radio image...\");\n"));
    assert!(script.contains("EMMC:/dev/block/by-name/modem:14:"));
    assert!(!script.contains("assert("));

    let metadata = read_entry(&output, metadata::PATH_METADATA).unwrap();
    assert!(metadata.is_empty());
}

#[test]
fn incremental_package() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("source.zip");
    let target = temp_dir.path().join("target.zip");
    let output = temp_dir.path().join("incremental.zip");

    write_archive(
        &source,
        &[("OTA/android-info.txt", b"require version-baseband=old\n")],
    );
    write_archive(
        &target,
        &[
            ("OTA/android-info.txt", b"require version-baseband=new\n"),
            ("RADIO/NON-HLOS.bin", b"modem firmware"),
        ],
    );

    let cli = IncrementalCli {
        source,
        target,
        output: output.clone(),
        api_version: 3,
        skip_assertions: false,
        config: no_config(),
    };
    let cancel_signal = AtomicBool::new(false);

    hooks::incremental_subcommand(&cli, &cancel_signal).unwrap();

    assert_eq!(read_entry(&output, "NON-HLOS.bin"), None);

    let script = read_entry(&output, edify::PATH_UPDATER_SCRIPT).unwrap();
    assert_eq!(
        String::from_utf8(script).unwrap(),
        "assert(getprop(\"ro.baseband\") == \"new\");\n",
    );

    let metadata = read_entry(&output, metadata::PATH_METADATA).unwrap();
    assert_eq!(metadata, b"pre-baseband=new\n");

    let metadata = metadata::parse_legacy(&String::from_utf8(metadata).unwrap()).unwrap();
    assert_eq!(metadata[metadata::KEY_PRE_BASEBAND], "new");
}

#[test]
fn full_package_bad_config() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("target_files.zip");
    let config = temp_dir.path().join("hooks.toml");

    write_archive(&input, &[]);
    fs::write(&config, "radio_dir = 1\n").unwrap();

    let cli = FullCli {
        input,
        output: temp_dir.path().join("ota.zip"),
        api_version: 3,
        skip_assertions: true,
        config: ConfigGroup {
            config: Some(config),
            block_device_dir: None,
        },
    };
    let cancel_signal = AtomicBool::new(false);

    assert!(hooks::full_subcommand(&cli, &cancel_signal).is_err());
}
