// SPDX-FileCopyrightText: 2016 The Android Open Source Project
// SPDX-License-Identifier: Apache-2.0

use regex::Regex;

/// Path of the device info file inside target files.
pub const PATH_ANDROID_INFO: &str = "OTA/android-info.txt";

const REQUIRE_BASEBAND_REGEX: &str = r"require\s+version-baseband\s*=\s*(\S+)";

/// Alternative that matches any baseband.
pub const WILDCARD: &str = "*";

/// Separator between acceptable baseband versions.
const SEPARATOR: char = '|';

/// A `require version-baseband=...` line from `android-info.txt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BasebandRequirement<'a> {
    raw: &'a str,
}

impl<'a> BasebandRequirement<'a> {
    /// The value exactly as it appears in the file.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn alternatives(&self) -> Vec<&'a str> {
        self.raw.split(SEPARATOR).collect()
    }

    /// Whether any baseband is acceptable.
    pub fn is_wildcard(&self) -> bool {
        self.raw.split(SEPARATOR).any(|b| b == WILDCARD)
    }
}

/// Find the first baseband requirement in the device info text.
pub fn find_baseband_requirement(data: &str) -> Option<BasebandRequirement<'_>> {
    // The pattern is a compile-time constant.
    let regex = Regex::new(REQUIRE_BASEBAND_REGEX).unwrap();
    let captures = regex.captures(data)?;

    captures.get(1).map(|m| BasebandRequirement { raw: m.as_str() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_baseband() {
        let data = "require board=msm8916\nrequire version-baseband = 12345\n";
        let req = find_baseband_requirement(data).unwrap();

        assert_eq!(req.raw(), "12345");
        assert_eq!(req.alternatives(), ["12345"]);
        assert!(!req.is_wildcard());
    }

    #[test]
    fn multiple_basebands() {
        let req = find_baseband_requirement("require version-baseband=M8916_1|M8916_2").unwrap();

        assert_eq!(req.raw(), "M8916_1|M8916_2");
        assert_eq!(req.alternatives(), ["M8916_1", "M8916_2"]);
        assert!(!req.is_wildcard());
    }

    #[test]
    fn wildcard_baseband() {
        let req = find_baseband_requirement("require version-baseband = 1|2|*").unwrap();

        assert_eq!(req.raw(), "1|2|*");
        assert!(req.is_wildcard());
    }

    #[test]
    fn no_requirement() {
        assert_eq!(find_baseband_requirement(""), None);
        assert_eq!(
            find_baseband_requirement("require version-bootloader=abc\n"),
            None,
        );
        assert_eq!(find_baseband_requirement("require version-baseband ="), None);
    }
}
