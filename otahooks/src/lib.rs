// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

//! The CLI is the only stable interface. Rust APIs can change at any time.

pub mod cli;
pub mod format;
pub mod hooks;
pub mod stream;
pub mod util;
