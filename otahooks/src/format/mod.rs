// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

pub mod androidinfo;
pub mod edify;
pub mod filesmap;
pub mod metadata;
pub mod zip;
