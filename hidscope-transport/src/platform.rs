//! Native link requirements of the hidapi backend, per platform target.
//!
//! Selection over the supported platform set is an exhaustive enum. An
//! unrecognized target is a loud configuration error, never a silent no-op
//! that would only surface later as a link failure.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Errors from platform target resolution
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlatformError {
    #[error("unsupported platform target: {0}")]
    Unsupported(String),
}

/// Platform targets the native backend is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlatformTarget {
    Windows64,
    Mac,
    Linux,
}

/// Export-visibility definition shared by the unix-like targets
const VISIBILITY_EXPORT: &str = "HID_API_EXPORT=__attribute__((visibility(\"default\")))";

/// What the native hidapi backend needs from the toolchain on one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeLinkSpec {
    pub definitions: &'static [&'static str],
    pub frameworks: &'static [&'static str],
    pub system_include_paths: &'static [&'static str],
    pub system_library_paths: &'static [&'static str],
    pub system_libraries: &'static [&'static str],
}

impl PlatformTarget {
    pub const ALL: [PlatformTarget; 3] = [Self::Windows64, Self::Mac, Self::Linux];

    /// Resolve the compile-time host platform.
    pub fn current() -> Result<Self, PlatformError> {
        if cfg!(target_os = "windows") {
            Ok(Self::Windows64)
        } else if cfg!(target_os = "macos") {
            Ok(Self::Mac)
        } else if cfg!(target_os = "linux") {
            Ok(Self::Linux)
        } else {
            Err(PlatformError::Unsupported(std::env::consts::OS.to_string()))
        }
    }

    /// Native build requirements of the hidapi backend on this target.
    pub fn link_spec(self) -> NativeLinkSpec {
        match self {
            Self::Windows64 => NativeLinkSpec {
                definitions: &["hidapi_winapi_EXPORTS=1"],
                frameworks: &[],
                system_include_paths: &[],
                system_library_paths: &[],
                system_libraries: &[],
            },
            Self::Mac => NativeLinkSpec {
                definitions: &[VISIBILITY_EXPORT],
                frameworks: &["IOKit", "CoreFoundation"],
                system_include_paths: &[],
                system_library_paths: &[],
                system_libraries: &[],
            },
            Self::Linux => NativeLinkSpec {
                definitions: &[VISIBILITY_EXPORT],
                frameworks: &[],
                system_include_paths: &["/usr/include", "/usr/include/x86_64-linux-gnu"],
                system_library_paths: &["/usr/lib/x86_64-linux-gnu"],
                system_libraries: &["udev"],
            },
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows64 => "Win64",
            Self::Mac => "Mac",
            Self::Linux => "Linux",
        };
        f.write_str(name)
    }
}

impl FromStr for PlatformTarget {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "win64" | "windows64" | "windows" => Ok(Self::Windows64),
            "mac" | "macos" | "darwin" => Ok(Self::Mac),
            "linux" => Ok(Self::Linux),
            _ => Err(PlatformError::Unsupported(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_spec_is_export_definition_only() {
        let spec = PlatformTarget::Windows64.link_spec();
        assert_eq!(spec.definitions, ["hidapi_winapi_EXPORTS=1"]);
        assert!(spec.frameworks.is_empty());
        assert!(spec.system_include_paths.is_empty());
        assert!(spec.system_library_paths.is_empty());
        assert!(spec.system_libraries.is_empty());
    }

    #[test]
    fn mac_spec_links_iokit_and_corefoundation() {
        let spec = PlatformTarget::Mac.link_spec();
        assert_eq!(
            spec.definitions,
            ["HID_API_EXPORT=__attribute__((visibility(\"default\")))"]
        );
        assert_eq!(spec.frameworks, ["IOKit", "CoreFoundation"]);
        assert!(spec.system_include_paths.is_empty());
        assert!(spec.system_library_paths.is_empty());
        assert!(spec.system_libraries.is_empty());
    }

    #[test]
    fn linux_spec_matches_udev_layout() {
        let spec = PlatformTarget::Linux.link_spec();
        assert_eq!(
            spec.definitions,
            ["HID_API_EXPORT=__attribute__((visibility(\"default\")))"]
        );
        assert!(spec.frameworks.is_empty());
        assert_eq!(
            spec.system_include_paths,
            ["/usr/include", "/usr/include/x86_64-linux-gnu"]
        );
        assert_eq!(spec.system_library_paths, ["/usr/lib/x86_64-linux-gnu"]);
        assert_eq!(spec.system_libraries, ["udev"]);
    }

    #[test]
    fn unknown_target_fails_loudly() {
        let err = "freebsd".parse::<PlatformTarget>().unwrap_err();
        assert_eq!(err, PlatformError::Unsupported("freebsd".to_string()));
        assert!("".parse::<PlatformTarget>().is_err());
    }

    #[test]
    fn known_target_spellings_parse() {
        assert_eq!(
            "Win64".parse::<PlatformTarget>().unwrap(),
            PlatformTarget::Windows64
        );
        assert_eq!(
            "macos".parse::<PlatformTarget>().unwrap(),
            PlatformTarget::Mac
        );
        assert_eq!(
            "Linux".parse::<PlatformTarget>().unwrap(),
            PlatformTarget::Linux
        );
    }

    #[test]
    fn every_target_has_a_spec() {
        for target in PlatformTarget::ALL {
            // Exhaustive by construction; the export definition is always set
            assert!(!target.link_spec().definitions.is_empty());
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for target in PlatformTarget::ALL {
            assert_eq!(target.to_string().parse::<PlatformTarget>(), Ok(target));
        }
    }
}
