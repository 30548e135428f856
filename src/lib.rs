//! Wandbind - Runtime Bindings for ImageMagick's MagickWand
//!
//! Generates a minimal declaration file from the installed ImageMagick
//! header tree, then loads the MagickWand and MagickCore shared
//! libraries dynamically and exposes their functions through a foreign
//! call interface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Platform         │  host toolchain + library names + marker rule
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ HeaderGenerator  │  cc -E over a synthetic translation unit,
//! └────────┬─────────┘  inline collapse, line reduction
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Declarations     │  name → parsed signature
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ Magick           │  probed MagickWand + MagickCore handles,
//! └──────────────────┘  cached once per process
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wandbind::{CValue, Magick};
//!
//! let magick = Magick::global()?;
//! magick.call("MagickWandGenesis", &[])?;
//! let wand = magick.call("NewMagickWand", &[])?.as_pointer();
//! let ok = magick.call(
//!     "MagickReadImage",
//!     &[CValue::Pointer(wand), CValue::string("rose:")?],
//! )?;
//! assert!(ok.as_bool());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The declaration reduction is a line-oriented heuristic tied to the
//! host preprocessor's marker format. It is not a C parser and only
//! covers what the MagickWand headers produce.

#![warn(clippy::all)]

pub mod ffi;
pub mod magick;
pub mod platform;
pub mod preprocess;

// Re-export commonly used types
pub use ffi::{
    probe_pair, read_cstring, read_pointer_slot, CType, CValue, Declarations, FfiError,
    SharedLibrary, Signature, HDRI_SUFFIXES, VERSION_SUFFIXES,
};
pub use magick::{Magick, MagickError, DEFAULT_HEADER_FILE};
pub use platform::{Platform, PlatformError};
pub use preprocess::{collapse_expanded_inlines, reduce, HeaderGenerator, PreprocessError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
