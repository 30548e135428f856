//! FFI Type Model
//!
//! C declarations are mapped onto a small closed set of value types.
//! Everything the parser does not recognize degrades to an opaque
//! pointer or a plain int, which is all the MagickWand API needs: its
//! object handles are opaque pointers and its enums are C ints.

use std::ffi::{CStr, CString, NulError};
use std::fmt;

use libc::c_char;

/// Value types supported for function parameters and return values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CType {
    /// No value
    Void,
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit unsigned integer (also size_t)
    U64,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer (also C enums)
    I32,
    /// 64-bit signed integer (also ssize_t)
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// Opaque pointer
    Ptr,
    /// Null-terminated C string (char *)
    CStr,
}

impl CType {
    /// Get the size in bytes of this type
    pub fn size(&self) -> usize {
        match self {
            CType::Void => 0,
            CType::U8 | CType::I8 => 1,
            CType::U16 | CType::I16 => 2,
            CType::U32 | CType::I32 | CType::F32 => 4,
            CType::U64 | CType::I64 | CType::F64 => 8,
            CType::Ptr | CType::CStr => std::mem::size_of::<usize>(),
        }
    }

    /// Check if this type is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, CType::F32 | CType::F64)
    }

    /// Check if this type is a pointer type
    pub fn is_pointer(&self) -> bool {
        matches!(self, CType::Ptr | CType::CStr)
    }

    /// Map a C type declaration fragment to a value type.
    ///
    /// Qualifiers and a trailing parameter name are ignored. `char *`
    /// becomes a C string; any other pointer shape is opaque. An
    /// unrecognized non-pointer name is treated as a C int, which
    /// covers the MagickWand enum typedefs.
    pub fn from_c(declaration: &str) -> Self {
        let spaced = declaration.replace('*', " * ");
        let mut stars = 0usize;
        let mut words: Vec<&str> = Vec::new();
        for token in spaced.split_whitespace() {
            match token {
                "*" => stars += 1,
                "const" | "volatile" | "register" | "restrict" | "signed" | "struct" | "enum"
                | "union" => {}
                word => words.push(word),
            }
        }

        if stars > 0 {
            return if stars == 1 && words.first() == Some(&"char") {
                CType::CStr
            } else {
                CType::Ptr
            };
        }

        match words.as_slice() {
            [] | ["void", ..] => CType::Void,
            ["unsigned", "char", ..] => CType::U8,
            ["unsigned", "short", ..] => CType::U16,
            ["unsigned", "long", "long", ..] => CType::U64,
            ["unsigned", "long", ..] => CType::U64,
            ["unsigned", ..] => CType::U32,
            ["char", ..] => CType::I8,
            ["short", ..] => CType::I16,
            ["int", ..] => CType::I32,
            ["long", "long", ..] => CType::I64,
            ["long", ..] => CType::I64,
            ["float", ..] => CType::F32,
            ["double", ..] => CType::F64,
            ["size_t", ..] => CType::U64,
            ["ssize_t", ..] => CType::I64,
            // MagickBooleanType, ChannelType and friends are C enums
            _ => CType::I32,
        }
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CType::Void => "void",
            CType::U8 => "u8",
            CType::U16 => "u16",
            CType::U32 => "u32",
            CType::U64 => "u64",
            CType::I8 => "i8",
            CType::I16 => "i16",
            CType::I32 => "i32",
            CType::I64 => "i64",
            CType::F32 => "f32",
            CType::F64 => "f64",
            CType::Ptr => "ptr",
            CType::CStr => "cstr",
        };
        write!(f, "{}", name)
    }
}

/// A value passed to or returned from a native function
#[derive(Debug, Clone)]
pub enum CValue {
    /// No value
    Void,
    /// Any integer width, widened to a machine word
    Integer(u64),
    /// 64-bit floating point
    Float(f64),
    /// Raw pointer value
    Pointer(usize),
    /// Owned NUL-terminated string, passed by pointer
    Str(CString),
}

impl CValue {
    /// Build a C string argument
    pub fn string(value: &str) -> Result<Self, NulError> {
        Ok(CValue::Str(CString::new(value)?))
    }

    /// Interpret a returned machine word according to the return type.
    ///
    /// Narrow integer returns keep only their own width; the upper bits
    /// of the word are not specified by the C ABI.
    pub fn from_word(word: u64, ty: CType) -> Self {
        match ty {
            CType::Void => CValue::Void,
            CType::U8 | CType::I8 => CValue::Integer(word & 0xff),
            CType::U16 | CType::I16 => CValue::Integer(word & 0xffff),
            CType::U32 | CType::I32 => CValue::Integer(word & 0xffff_ffff),
            CType::U64 | CType::I64 => CValue::Integer(word),
            CType::F32 => CValue::Float(f32::from_bits(word as u32) as f64),
            CType::F64 => CValue::Float(f64::from_bits(word)),
            CType::Ptr | CType::CStr => CValue::Pointer(word as usize),
        }
    }

    /// Convert to the machine word handed to the callee
    pub fn to_word(&self) -> u64 {
        match self {
            CValue::Void => 0,
            CValue::Integer(v) => *v,
            CValue::Float(v) => v.to_bits(),
            CValue::Pointer(v) => *v as u64,
            CValue::Str(s) => s.as_ptr() as u64,
        }
    }

    /// Read as a pointer value
    pub fn as_pointer(&self) -> usize {
        match self {
            CValue::Pointer(v) => *v,
            CValue::Integer(v) => *v as usize,
            CValue::Str(s) => s.as_ptr() as usize,
            CValue::Void | CValue::Float(_) => 0,
        }
    }

    /// MagickBooleanType-style truth: anything non-zero
    pub fn as_bool(&self) -> bool {
        self.to_word() != 0
    }

    /// Check if this is a void value
    pub fn is_void(&self) -> bool {
        matches!(self, CValue::Void)
    }
}

/// Read a returned `char *` as an owned string.
///
/// # Safety
///
/// `addr` must be null or point to a valid NUL-terminated string that
/// stays alive for the duration of the call.
pub unsafe fn read_cstring(addr: usize) -> Option<String> {
    if addr == 0 {
        return None;
    }
    Some(
        CStr::from_ptr(addr as *const c_char)
            .to_string_lossy()
            .into_owned(),
    )
}

/// Read one element of a returned pointer array (e.g. a PixelWand row).
///
/// # Safety
///
/// `base` must point to an array of at least `index + 1` pointers.
pub unsafe fn read_pointer_slot(base: usize, index: usize) -> usize {
    *(base as *const usize).add(index)
}

/// Function signature parsed from the declaration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Function name
    pub name: String,
    /// Parameter types
    pub params: Vec<CType>,
    /// Return type
    pub return_type: CType,
    /// Whether this function is variadic
    pub variadic: bool,
}

impl Signature {
    /// Create a new function signature
    pub fn new(name: impl Into<String>, params: Vec<CType>, return_type: CType) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            variadic: false,
        }
    }

    /// Validate argument count
    pub fn validate_args(&self, arg_count: usize) -> bool {
        if self.variadic {
            arg_count >= self.params.len()
        } else {
            arg_count == self.params.len()
        }
    }

    /// Parse a single reduced-header line as a function prototype.
    ///
    /// Accepts `[extern|static] <ret> <name>(<params>);` with pointer
    /// returns and opaque parameter types. Returns `None` for anything
    /// else (typedefs, enum bodies, variables, function-pointer
    /// shapes), which the caller skips.
    pub fn parse_prototype(line: &str) -> Option<Self> {
        let line = line.trim().strip_suffix(';')?.trim_end();
        let line = line.strip_suffix(')')?;
        if line.starts_with("typedef") {
            return None;
        }

        let open = line.find('(')?;
        let (before, rest) = line.split_at(open);
        let params = &rest[1..];
        if params.contains('(') || params.contains(')') {
            return None;
        }

        let before = before.trim_end();
        if before.contains('=') {
            return None;
        }
        let name_start = before
            .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .map(|i| i + 1)
            .unwrap_or(0);
        let name = &before[name_start..];
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }

        let mut return_decl = before[..name_start].trim();
        for qualifier in ["extern", "static"] {
            if let Some(stripped) = return_decl.strip_prefix(qualifier) {
                return_decl = stripped.trim_start();
            }
        }
        if return_decl.is_empty() {
            return None;
        }
        let return_type = CType::from_c(return_decl);

        let mut types = Vec::new();
        let mut variadic = false;
        let params = params.trim();
        if !params.is_empty() && params != "void" {
            for segment in params.split(',') {
                let segment = segment.trim();
                if segment.is_empty() {
                    return None;
                }
                if segment == "..." {
                    variadic = true;
                    continue;
                }
                types.push(CType::from_c(segment));
            }
        }

        Some(Self {
            name: name.to_string(),
            params: types,
            return_type,
            variadic,
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        if self.variadic {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}
