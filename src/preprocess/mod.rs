//! Header Generation Pipeline
//!
//! Produces the reduced declaration file that drives the FFI layer.
//! The pipeline shells out to the host C preprocessor with a tiny
//! synthetic translation unit including `<wand/MagickWand.h>`, rewrites
//! expanded inline functions back into bare declarations, then filters
//! the output down to the declarations originating from the ImageMagick
//! header tree.
//!
//! ```text
//! synthetic .c ──► cc -E ──► inline collapse ──► line reduction ──► header file
//! ```
//!
//! The reduction is a line-oriented heuristic, not a C parser. It
//! depends on the exact linemarker format of the host preprocessor and
//! on what the MagickWand headers happen to produce; it makes no
//! correctness guarantee beyond that.

mod generate;
mod inline;
mod reduce;

pub use generate::{HeaderGenerator, PreprocessError};
pub use inline::collapse_expanded_inlines;
pub use reduce::reduce;
