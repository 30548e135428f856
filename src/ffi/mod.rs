//! Foreign Call Interface
//!
//! Turns the reduced declaration file into callable bindings:
//!
//! ```text
//! declaration file
//!       │
//!       ▼
//! Declarations (name → Signature)
//!       │
//!       ▼
//! SharedLibrary (libloading + symbol cache)
//!       │
//!       ▼
//! Native Function Call
//! ```
//!
//! Values cross the boundary as machine words; the parsed signature
//! decides how each word is built and how the return word is read back.

mod declarations;
mod loader;
mod types;

pub use declarations::Declarations;
pub use loader::{probe_pair, FfiError, SharedLibrary, HDRI_SUFFIXES, VERSION_SUFFIXES};
pub use types::{read_cstring, read_pointer_slot, CType, CValue, Signature};

#[cfg(test)]
mod tests;
