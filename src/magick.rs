//! Loaded ImageMagick Runtime
//!
//! Owns the parsed declarations plus the two opened libraries, and
//! exposes the process-wide initialize-once accessor. The cache is an
//! explicit object handed to callers; repeat calls to [`Magick::global`]
//! return the same handles without touching the toolchain or the
//! dynamic loader again.

use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::ffi::{self, probe_pair, CValue, Declarations, FfiError, SharedLibrary};
use crate::platform::{Platform, PlatformError};
use crate::preprocess::{HeaderGenerator, PreprocessError};

/// Declaration file maintained beside the tooling
pub const DEFAULT_HEADER_FILE: &str = "magickwand.h";

/// Process-wide cache behind [`Magick::global`]
static MAGICK: OnceCell<Magick> = OnceCell::new();

/// Errors raised while bringing the runtime up
#[derive(Debug, Error)]
pub enum MagickError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Ffi(#[from] FfiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The loaded MagickWand/MagickCore pair plus its compiled interface
pub struct Magick {
    declarations: Declarations,
    wand: SharedLibrary,
    core: SharedLibrary,
}

impl Magick {
    /// Run the full pipeline against the given declaration-file path:
    /// generate the file if absent, parse it, then probe and open the
    /// libraries.
    pub fn load(header: impl AsRef<Path>) -> Result<Self, MagickError> {
        let header = header.as_ref();
        let platform = Platform::host()?;

        HeaderGenerator::new(platform, header).ensure()?;
        let declarations = Declarations::parse(&fs::read_to_string(header)?);

        let (wand, core) = probe_pair(
            platform.wand_library_name(),
            platform.core_library_name(),
        )?;

        Ok(Self {
            declarations,
            wand,
            core,
        })
    }

    /// Process-wide accessor with initialize-once semantics.
    ///
    /// The first call runs [`Magick::load`] against the default
    /// declaration file; every later call returns the same instance.
    pub fn global() -> Result<&'static Magick, MagickError> {
        MAGICK.get_or_try_init(|| Magick::load(DEFAULT_HEADER_FILE))
    }

    /// The parsed function declarations
    pub fn declarations(&self) -> &Declarations {
        &self.declarations
    }

    /// The opened MagickWand library
    pub fn wand(&self) -> &SharedLibrary {
        &self.wand
    }

    /// The opened MagickCore library
    pub fn core(&self) -> &SharedLibrary {
        &self.core
    }

    /// Call a declared function by name.
    ///
    /// The symbol is looked up in the wand library first and falls back
    /// to the core library, mirroring how the two handles are probed as
    /// a pair.
    pub fn call(&self, name: &str, args: &[CValue]) -> Result<CValue, FfiError> {
        let signature = self
            .declarations
            .get(name)
            .ok_or_else(|| FfiError::UnknownFunction(name.to_string()))?;

        match self.wand.call(signature, args) {
            Err(FfiError::SymbolNotFound(_)) => self.core.call(signature, args),
            other => other,
        }
    }

    /// ImageMagick version string and numeric version
    pub fn version(&self) -> Result<(String, usize), FfiError> {
        let mut number: libc::size_t = 0;
        let value = self.call(
            "GetMagickVersion",
            &[CValue::Pointer(&mut number as *mut libc::size_t as usize)],
        )?;
        // Safety: GetMagickVersion returns a static string.
        let text = unsafe { ffi::read_cstring(value.as_pointer()) }.unwrap_or_default();
        Ok((text, number))
    }

    /// ImageMagick release date string
    pub fn release_date(&self) -> Result<String, FfiError> {
        let value = self.call("GetMagickReleaseDate", &[])?;
        // Safety: GetMagickReleaseDate returns a static string.
        Ok(unsafe { ffi::read_cstring(value.as_pointer()) }.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_file_name() {
        assert_eq!(DEFAULT_HEADER_FILE, "magickwand.h");
    }

    #[test]
    fn test_unknown_function_error() {
        // A runtime over an empty declaration set still rejects calls
        // cleanly; no library probing is involved in the lookup path.
        let declarations = Declarations::parse("");
        assert!(declarations.get("MagickWandGenesis").is_none());
    }
}
