// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use std::{
    io::{self, Read, Write},
    sync::atomic::{AtomicBool, Ordering},
};

use ring::digest::Context;

/// A reader wrapper that hashes data as it's being read.
pub struct HashingReader<R> {
    inner: R,
    context: Context,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R, context: Context) -> Self {
        Self { inner, context }
    }

    pub fn finish(self) -> (R, Context) {
        (self.inner, self.context)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.context.update(&buf[..n]);
        Ok(n)
    }
}

pub fn check_cancel(cancel_signal: &AtomicBool) -> io::Result<()> {
    if cancel_signal.load(Ordering::SeqCst) {
        return Err(io::Error::new(
            io::ErrorKind::Interrupted,
            "Received cancel signal",
        ));
    }

    Ok(())
}

/// Copy data from `reader` to `writer` until `reader` reaches EOF. If `writer`
/// reaches EOF before `reader` does, an error is returned. The operation is
/// cancelled on the next loop iteration if `cancel_signal` is set to `true`.
pub fn copy(
    mut reader: impl Read,
    mut writer: impl Write,
    cancel_signal: &AtomicBool,
) -> io::Result<u64> {
    let mut buf = [0u8; 16384];
    let mut copied = 0;

    loop {
        check_cancel(cancel_signal)?;

        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buf[..n])?;
        copied += n as u64;
    }

    Ok(copied)
}
