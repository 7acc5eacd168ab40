// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

//! Device-specific steps run by the OTA packaging flow. Each hook is invoked
//! at a fixed point while building a package and only appends to the
//! installer script, the update metadata, and the output archive.

pub mod assertions;
pub mod config;
pub mod context;
pub mod radio;
