//! Expanded Inline Collapse
//!
//! A C89 preprocessing pass leaves `static inline` function bodies
//! fully expanded in the output. The declaration parser only wants
//! prototypes, so the bodies are rewritten back into bare declarations
//! before reduction.

use once_cell::sync::Lazy;
use regex::Regex;

static STATIC_INLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?msx)
        ^static\s_*inline\s                     # key line identifier
        (?P<ret>\w+|unsigned\schar)\s           # return type
        (?P<name>\w+)                           # function name
        \((?P<args>.*?)\)\s*                    # argument list
        \{.*?^\}                                # body, up to a line-leading brace
        ",
    )
    .expect("static inline pattern")
});

/// Rewrite every expanded `static inline` (or `static __inline`)
/// function body into a `static <ret> <name>(<args>);` declaration.
///
/// The block match is only balanced enough for what the MagickWand
/// headers produce: it ends at the first `}` in column zero. Nested
/// braces at column zero or braces inside string literals would break
/// it; none occur in practice.
pub fn collapse_expanded_inlines(buffer: &str) -> String {
    STATIC_INLINE_RE
        .replace_all(buffer, "static ${ret} ${name}(${args});\n")
        .into_owned()
}
