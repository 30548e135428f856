//! Dynamic Library Loader
//!
//! Opens the ImageMagick shared libraries through libloading and
//! dispatches calls into them by arity.

use std::collections::HashMap;
use std::ffi::CString;
use std::mem::transmute;
use std::sync::RwLock;

use libloading::Library;
use thiserror::Error;

use super::types::{CValue, Signature};

/// FFI and library-acquisition errors
#[derive(Debug, Error)]
pub enum FfiError {
    #[error("Failed to load library '{name}': {reason}")]
    Open { name: String, reason: String },

    #[error("Unable to locate ImageMagick libraries ({tried} name combinations tried)")]
    LibraryNotFound { tried: usize },

    #[error("Symbol '{0}' not found")]
    SymbolNotFound(String),

    #[error("Invalid symbol name: {0}")]
    InvalidSymbol(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid argument count for {name}: expected {expected}, got {got}")]
    InvalidArgCount {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Too many arguments: {0} (max 6)")]
    TooManyArgs(usize),
}

/// Version suffixes probed after the bare base name
pub const VERSION_SUFFIXES: &[&str] = &["", "-Q16", "-Q8", "-6.Q16"];

/// Quantum-variant suffixes probed for each version
pub const HDRI_SUFFIXES: &[&str] = &["", "HDRI"];

/// A dynamically loaded shared library with a symbol-address cache
#[derive(Debug)]
pub struct SharedLibrary {
    /// Filename the dynamic loader resolved
    filename: String,
    /// The loaded library handle
    library: Library,
    /// Cached symbol addresses
    symbols: RwLock<HashMap<String, usize>>,
}

impl SharedLibrary {
    /// Open a library by base name (`MagickWand-6.Q16`), constructing
    /// the platform filename unless one was given outright.
    pub fn open(name: &str) -> Result<Self, FfiError> {
        let filename = library_filename(name);

        // Safety: loading a shared library runs its initializers. The
        // probe list only names ImageMagick installations.
        let library = unsafe {
            Library::new(&filename).map_err(|e| FfiError::Open {
                name: filename.clone(),
                reason: e.to_string(),
            })?
        };

        Ok(Self {
            filename,
            library,
            symbols: RwLock::new(HashMap::new()),
        })
    }

    /// Filename the library was opened under
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolve a function symbol, caching its address
    pub fn symbol(&self, name: &str) -> Result<usize, FfiError> {
        if let Some(&addr) = self
            .symbols
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Ok(addr);
        }

        let c_name = CString::new(name)
            .map_err(|_| FfiError::InvalidSymbol(name.to_string()))?;

        // Safety: the symbol is only ever called through a signature
        // parsed from the same installation's headers.
        let addr = unsafe {
            let symbol: libloading::Symbol<'_, *const ()> = self
                .library
                .get(c_name.as_bytes_with_nul())
                .map_err(|_| FfiError::SymbolNotFound(name.to_string()))?;
            *symbol as usize
        };

        self.symbols
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), addr);
        Ok(addr)
    }

    /// Call a function with the given signature and arguments.
    ///
    /// Arguments are passed as machine words; the return word (or
    /// float register for floating returns) is interpreted per the
    /// signature's return type.
    pub fn call(&self, signature: &Signature, args: &[CValue]) -> Result<CValue, FfiError> {
        if !signature.validate_args(args.len()) {
            return Err(FfiError::InvalidArgCount {
                name: signature.name.clone(),
                expected: signature.params.len(),
                got: args.len(),
            });
        }

        let addr = self.symbol(&signature.name)?;
        let words: Vec<u64> = args.iter().map(CValue::to_word).collect();

        // Floating returns come back in a float register, so they need
        // their own function-pointer shapes.
        if signature.return_type.is_float() {
            let value = unsafe { dispatch_float(addr, &words)? };
            return Ok(CValue::Float(value));
        }

        let word = unsafe { dispatch_word(addr, &words)? };
        Ok(CValue::from_word(word, signature.return_type))
    }
}

/// Call a word-returning function by arity.
///
/// # Safety
///
/// `addr` must be the address of an `extern "C"` function taking
/// exactly `args.len()` word-sized arguments.
unsafe fn dispatch_word(addr: usize, args: &[u64]) -> Result<u64, FfiError> {
    Ok(match *args {
        [] => transmute::<usize, unsafe extern "C" fn() -> u64>(addr)(),
        [a] => transmute::<usize, unsafe extern "C" fn(u64) -> u64>(addr)(a),
        [a, b] => transmute::<usize, unsafe extern "C" fn(u64, u64) -> u64>(addr)(a, b),
        [a, b, c] => {
            transmute::<usize, unsafe extern "C" fn(u64, u64, u64) -> u64>(addr)(a, b, c)
        }
        [a, b, c, d] => {
            transmute::<usize, unsafe extern "C" fn(u64, u64, u64, u64) -> u64>(addr)(a, b, c, d)
        }
        [a, b, c, d, e] => transmute::<usize, unsafe extern "C" fn(u64, u64, u64, u64, u64) -> u64>(
            addr,
        )(a, b, c, d, e),
        [a, b, c, d, e, f] => transmute::<
            usize,
            unsafe extern "C" fn(u64, u64, u64, u64, u64, u64) -> u64,
        >(addr)(a, b, c, d, e, f),
        _ => return Err(FfiError::TooManyArgs(args.len())),
    })
}

/// Call a double-returning function by arity.
///
/// # Safety
///
/// Same contract as [`dispatch_word`], for functions returning a C
/// `float` or `double`.
unsafe fn dispatch_float(addr: usize, args: &[u64]) -> Result<f64, FfiError> {
    Ok(match *args {
        [] => transmute::<usize, unsafe extern "C" fn() -> f64>(addr)(),
        [a] => transmute::<usize, unsafe extern "C" fn(u64) -> f64>(addr)(a),
        [a, b] => transmute::<usize, unsafe extern "C" fn(u64, u64) -> f64>(addr)(a, b),
        [a, b, c] => {
            transmute::<usize, unsafe extern "C" fn(u64, u64, u64) -> f64>(addr)(a, b, c)
        }
        [a, b, c, d] => {
            transmute::<usize, unsafe extern "C" fn(u64, u64, u64, u64) -> f64>(addr)(a, b, c, d)
        }
        [a, b, c, d, e] => transmute::<usize, unsafe extern "C" fn(u64, u64, u64, u64, u64) -> f64>(
            addr,
        )(a, b, c, d, e),
        [a, b, c, d, e, f] => transmute::<
            usize,
            unsafe extern "C" fn(u64, u64, u64, u64, u64, u64) -> f64,
        >(addr)(a, b, c, d, e, f),
        _ => return Err(FfiError::TooManyArgs(args.len())),
    })
}

/// Probe the version/variant suffix cross product until one suffix
/// opens BOTH the wand and the core library.
///
/// The first successful combination wins; on hosts with several
/// installed ImageMagick versions, which one binds is therefore decided
/// by probe order, not by version.
pub fn probe_pair(
    wand_base: &str,
    core_base: &str,
) -> Result<(SharedLibrary, SharedLibrary), FfiError> {
    let mut tried = 0;
    for version in VERSION_SUFFIXES {
        for hdri in HDRI_SUFFIXES {
            tried += 1;
            let suffix = format!("{}{}", version, hdri);
            let wand = match SharedLibrary::open(&format!("{}{}", wand_base, suffix)) {
                Ok(library) => library,
                Err(_) => continue,
            };
            if let Ok(core) = SharedLibrary::open(&format!("{}{}", core_base, suffix)) {
                return Ok((wand, core));
            }
        }
    }
    Err(FfiError::LibraryNotFound { tried })
}

/// Construct the platform-specific library filename.
///
/// Names already carrying a library extension pass through untouched.
fn library_filename(name: &str) -> String {
    #[cfg(target_os = "linux")]
    {
        if name.contains(".so") {
            name.to_string()
        } else {
            format!("lib{}.so", name)
        }
    }

    #[cfg(target_os = "macos")]
    {
        if name.ends_with(".dylib") {
            name.to_string()
        } else {
            format!("lib{}.dylib", name)
        }
    }

    #[cfg(target_os = "windows")]
    {
        if name.ends_with(".dll") {
            name.to_string()
        } else {
            format!("{}.dll", name)
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        name.to_string()
    }
}
