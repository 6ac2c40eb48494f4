// Copyright 2025 AOT Benchmarker Contributors
// SPDX-License-Identifier: Apache-2.0

//! Target operating systems.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Operating systems a configuration can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    /// Windows
    Windows,
    /// Linux
    Linux,
    /// macOS
    Macos,
}

impl TargetOs {
    /// Every supported target OS.
    pub const ALL: [TargetOs; 3] = [TargetOs::Windows, TargetOs::Linux, TargetOs::Macos];

    /// Lowercase name, as written in benchmark descriptions and passed to
    /// the compiler's `--targetos`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Macos => "macos",
        }
    }

    /// Three letter code used in output directory names and crank profiles.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Windows => "win",
            Self::Linux => "lin",
            Self::Macos => "mac",
        }
    }

    /// The OS this process is running on, if supported.
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "windows" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Macos),
            _ => None,
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "linux" | "lin" => Ok(Self::Linux),
            "macos" | "osx" | "mac" => Ok(Self::Macos),
            _ => Err(CoreError::UnsupportedOs(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Linux".parse::<TargetOs>().unwrap(), TargetOs::Linux);
        assert_eq!("WINDOWS".parse::<TargetOs>().unwrap(), TargetOs::Windows);
        assert_eq!("macos".parse::<TargetOs>().unwrap(), TargetOs::Macos);
    }

    #[test]
    fn test_unknown_os_is_rejected() {
        let err = "solaris".parse::<TargetOs>().unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedOs(ref os) if os == "solaris"));
    }

    #[test]
    fn test_codes() {
        assert_eq!(TargetOs::Linux.code(), "lin");
        assert_eq!(TargetOs::Windows.code(), "win");
        assert_eq!(TargetOs::Macos.code(), "mac");
    }
}
