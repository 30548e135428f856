//! Host Platform Dispatch
//!
//! Selects the toolchain command lines, library base names, and
//! preprocessor line-classification rule for the host operating system.
//! The set of supported platforms is closed; anything else fails fast.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Platform detection errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Unsupported platform: {0}")]
    Unsupported(String),
}

/// Default ImageMagick installation root on Windows when MAGICK_HOME is unset
const DEFAULT_MAGICK_HOME: &str = "C:\\Program Files\\ImageMagick-6.9.0-Q16";

/// Synthetic translation unit handed to the Unix preprocessors.
///
/// The defines neutralize constructs a C89 preprocessing pass chokes on
/// inside the MagickWand header tree.
const CPP_INPUT: &str = "\
#define __attribute__(x)
#define va_list void *
#define time_t long
#include <wand/MagickWand.h>
";

/// Synthetic translation unit for the MSVC preprocessor.
const WIN_CPP_INPUT: &str = "\
#define va_list char *
#define time_t unsigned int
#include <wand/MagickWand.h>
";

/// Supported host platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Detect the platform this process is running on
    pub fn host() -> Result<Self, PlatformError> {
        Self::from_os(env::consts::OS)
    }

    /// Map an operating system identifier to a platform
    pub fn from_os(os: &str) -> Result<Self, PlatformError> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            other => Err(PlatformError::Unsupported(other.to_string())),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
            Self::Windows => "Windows",
        }
    }

    /// Preprocessor command line, without the translation unit argument
    pub fn preprocessor_command(&self) -> Vec<String> {
        let argv: &[&str] = match self {
            Self::Linux => &["gcc", "-xc", "-E", "-std=c89"],
            Self::Darwin => &["clang", "-arch", "x86_64", "-xc", "-E", "-std=c89"],
            Self::Windows => &["cl", "/E"],
        };
        argv.iter().map(|s| s.to_string()).collect()
    }

    /// Command that reports the compiler flags for the installed
    /// ImageMagick, or `None` where no such tool exists
    pub fn magick_config_command(&self) -> Option<Vec<String>> {
        match self {
            Self::Linux | Self::Darwin => Some(vec![
                "MagickWand-config".to_string(),
                "--cflags".to_string(),
            ]),
            Self::Windows => None,
        }
    }

    /// Extra include flags, for platforms without a config tool
    pub fn include_flags(&self) -> Vec<String> {
        match self {
            Self::Linux | Self::Darwin => Vec::new(),
            Self::Windows => {
                vec![format!("/I{}\\include", self.magick_home().display())]
            }
        }
    }

    /// The translation unit to preprocess
    pub fn translation_unit(&self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => CPP_INPUT,
            Self::Windows => WIN_CPP_INPUT,
        }
    }

    /// Base name of the MagickWand shared library
    pub fn wand_library_name(&self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => "MagickWand",
            Self::Windows => "CORE_RL_wand_",
        }
    }

    /// Base name of the MagickCore shared library
    pub fn core_library_name(&self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => "MagickCore",
            Self::Windows => "CORE_RL_magick_",
        }
    }

    /// ImageMagick installation root, honoring the MAGICK_HOME override
    pub fn magick_home(&self) -> PathBuf {
        PathBuf::from(env::var("MAGICK_HOME").unwrap_or_else(|_| DEFAULT_MAGICK_HOME.to_string()))
    }

    /// Classify a preprocessor marker line as system-origin.
    ///
    /// On Unix the GNU linemarkers `# <num> "<path>" <flags...>` carry
    /// flag `3` for system headers. MSVC's `#line` markers carry no
    /// flags, so the path is matched against the ImageMagick tree
    /// instead. Declarations following a system-origin marker are
    /// discarded during reduction.
    pub fn is_system_line(&self, line: &str) -> bool {
        match self {
            Self::Linux | Self::Darwin => {
                linemarker_flags(line).iter().any(|flag| flag == "3")
            }
            Self::Windows => !(line.contains("magick") || line.contains("wand")),
        }
    }
}

/// Extract the trailing flag tokens of a GNU linemarker.
///
/// The marker grammar is `# <linenum> "<path>" <flag> <flag> ...` where
/// the path may contain spaces. Everything after the closing quote is a
/// flag token. Lines that do not fit the grammar yield no flags.
fn linemarker_flags(line: &str) -> Vec<String> {
    let open = match line.find('"') {
        Some(i) => i,
        None => return Vec::new(),
    };
    let close = match line[open + 1..].find('"') {
        Some(i) => open + 1 + i,
        None => return Vec::new(),
    };
    line[close + 1..]
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}
