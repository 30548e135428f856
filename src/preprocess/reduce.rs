//! Declaration Reduction
//!
//! Filters preprocessor output down to the declarations that originate
//! from the ImageMagick header tree, joining continuation lines so that
//! every output line is a complete statement.

use crate::platform::Platform;

/// The preprocessor does not expand the `DefaultChannels` macro, so the
/// enumerator line survives with the macro name as its value. Patch in
/// the literal the macro stands for.
const DEFAULT_CHANNELS_PATCH: &str = "  DefaultChannels = 0x7ffffff7";

/// Reduce preprocessor output to library-origin declarations.
///
/// A single linear pass over the lines:
/// - a `#` marker line updates the current system/library origin via
///   the platform's classification rule and is dropped;
/// - blank lines are dropped;
/// - a line mentioning `DefaultChannels =` is replaced wholesale;
/// - lines inside system-origin regions are dropped;
/// - surviving lines are joined so each emitted line either ends in `;`
///   or starts with `}`.
pub fn reduce(platform: Platform, buffer: &str) -> String {
    let mut reduced = String::new();
    let mut ignore = false;
    for raw in buffer.split('\n') {
        let mut line = raw.trim();
        if line.starts_with('#') {
            ignore = platform.is_system_line(line);
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if line.contains("DefaultChannels =") {
            line = DEFAULT_CHANNELS_PATCH;
        }
        if ignore {
            continue;
        }
        reduced.push_str(line);
        if line.ends_with(';') || line.starts_with('}') {
            reduced.push('\n');
        } else {
            reduced.push(' ');
        }
    }
    reduced
}
