//! FFI Module Tests

use super::*;

#[test]
fn test_ctype_primitives() {
    assert_eq!(CType::from_c("void"), CType::Void);
    assert_eq!(CType::from_c("int"), CType::I32);
    assert_eq!(CType::from_c("unsigned int"), CType::U32);
    assert_eq!(CType::from_c("unsigned"), CType::U32);
    assert_eq!(CType::from_c("unsigned char"), CType::U8);
    assert_eq!(CType::from_c("long"), CType::I64);
    assert_eq!(CType::from_c("unsigned long"), CType::U64);
    assert_eq!(CType::from_c("size_t"), CType::U64);
    assert_eq!(CType::from_c("ssize_t"), CType::I64);
    assert_eq!(CType::from_c("float"), CType::F32);
    assert_eq!(CType::from_c("double"), CType::F64);
}

#[test]
fn test_ctype_pointers() {
    assert_eq!(CType::from_c("char *"), CType::CStr);
    assert_eq!(CType::from_c("const char *name"), CType::CStr);
    assert_eq!(CType::from_c("unsigned char *blob"), CType::Ptr);
    assert_eq!(CType::from_c("void *"), CType::Ptr);
    assert_eq!(CType::from_c("MagickWand *wand"), CType::Ptr);
    assert_eq!(CType::from_c("const PixelWand **pixels"), CType::Ptr);
    assert_eq!(CType::from_c("char **argv"), CType::Ptr);
}

#[test]
fn test_ctype_unknown_names_are_enums() {
    assert_eq!(CType::from_c("MagickBooleanType"), CType::I32);
    assert_eq!(CType::from_c("ChannelType channel"), CType::I32);
    assert_eq!(CType::from_c("ExceptionType"), CType::I32);
}

#[test]
fn test_ctype_qualifiers_dropped() {
    assert_eq!(CType::from_c("const double"), CType::F64);
    assert_eq!(CType::from_c("const struct _Image *image"), CType::Ptr);
    assert_eq!(CType::from_c("signed char"), CType::I8);
}

#[test]
fn test_cvalue_word_round_trip() {
    let value = CValue::from_word(42, CType::U64);
    assert_eq!(value.to_word(), 42);

    // Narrow returns drop the unspecified upper bits.
    let value = CValue::from_word(0xdead_beef_0000_0001, CType::I32);
    assert_eq!(value.to_word(), 1);

    let pi = std::f64::consts::PI;
    let value = CValue::from_word(pi.to_bits(), CType::F64);
    match value {
        CValue::Float(v) => assert!((v - pi).abs() < 1e-12),
        other => panic!("expected Float, got {:?}", other),
    }

    let value = CValue::from_word(0x1234, CType::Ptr);
    assert_eq!(value.as_pointer(), 0x1234);
}

#[test]
fn test_cvalue_string_argument() {
    let value = CValue::string("rose:").unwrap();
    assert_ne!(value.to_word(), 0);
    assert!(value.as_bool());
    assert!(CValue::string("interior\0nul").is_err());
}

#[test]
fn test_cvalue_bool() {
    assert!(!CValue::Integer(0).as_bool());
    assert!(CValue::Integer(1).as_bool());
    assert!(!CValue::Void.as_bool());
}

#[test]
fn test_parse_prototype_basic() {
    let sig = Signature::parse_prototype(
        "extern MagickBooleanType MagickReadImage(MagickWand *,const char *);",
    )
    .unwrap();
    assert_eq!(sig.name, "MagickReadImage");
    assert_eq!(sig.return_type, CType::I32);
    assert_eq!(sig.params, vec![CType::Ptr, CType::CStr]);
    assert!(!sig.variadic);
}

#[test]
fn test_parse_prototype_pointer_return() {
    let sig = Signature::parse_prototype(
        "extern char *MagickGetException(const MagickWand *,ExceptionType *);",
    )
    .unwrap();
    assert_eq!(sig.name, "MagickGetException");
    assert_eq!(sig.return_type, CType::CStr);
    assert_eq!(sig.params, vec![CType::Ptr, CType::Ptr]);
}

#[test]
fn test_parse_prototype_void_params() {
    let sig = Signature::parse_prototype("extern void MagickWandGenesis(void);").unwrap();
    assert_eq!(sig.name, "MagickWandGenesis");
    assert_eq!(sig.return_type, CType::Void);
    assert!(sig.params.is_empty());

    let sig = Signature::parse_prototype("extern MagickWand *NewMagickWand(void);").unwrap();
    assert_eq!(sig.name, "NewMagickWand");
    assert_eq!(sig.return_type, CType::Ptr);
    assert!(sig.params.is_empty());
}

#[test]
fn test_parse_prototype_collapsed_inline() {
    let sig =
        Signature::parse_prototype("static double MagickEpsilonReciprocal(const double x);")
            .unwrap();
    assert_eq!(sig.name, "MagickEpsilonReciprocal");
    assert_eq!(sig.return_type, CType::F64);
    assert_eq!(sig.params, vec![CType::F64]);
}

#[test]
fn test_parse_prototype_variadic() {
    let sig = Signature::parse_prototype("extern int FormatLocaleFile(void *,const char *,...);")
        .unwrap();
    assert!(sig.variadic);
    assert_eq!(sig.params, vec![CType::Ptr, CType::CStr]);
    assert!(sig.validate_args(2));
    assert!(sig.validate_args(5));
    assert!(!sig.validate_args(1));
}

#[test]
fn test_parse_prototype_rejects_non_functions() {
    // Typedefs, enum bodies, variables, and function-pointer shapes
    assert!(Signature::parse_prototype("typedef struct _MagickWand MagickWand;").is_none());
    assert!(Signature::parse_prototype(
        "typedef enum { UndefinedChannel, DefaultChannels = 0x7ffffff7 } ChannelType;"
    )
    .is_none());
    assert!(Signature::parse_prototype("extern const char *MagickHome;").is_none());
    assert!(Signature::parse_prototype(
        "extern void MagickSetHandler(void (*handler)(int));"
    )
    .is_none());
    assert!(Signature::parse_prototype("}").is_none());
    assert!(Signature::parse_prototype("").is_none());
}

#[test]
fn test_signature_display() {
    let sig = Signature::new("PixelSetColor", vec![CType::Ptr, CType::CStr], CType::I32);
    assert_eq!(sig.to_string(), "i32 PixelSetColor(ptr, cstr)");
}

#[test]
fn test_signature_validation() {
    let sig = Signature::new("MagickNewImage", vec![CType::Ptr; 4], CType::I32);
    assert!(sig.validate_args(4));
    assert!(!sig.validate_args(3));
    assert!(!sig.validate_args(5));
}

#[test]
fn test_declarations_parse() {
    let header = concat!(
        "typedef struct _MagickWand MagickWand;\n",
        "extern void MagickWandGenesis(void);\n",
        "extern void MagickWandTerminus(void);\n",
        "extern MagickWand *NewMagickWand(void);\n",
        "extern size_t MagickGetImageWidth(MagickWand *);\n",
        "typedef enum { UndefinedChannel } ChannelType;\n",
    );
    let declarations = Declarations::parse(header);
    assert_eq!(declarations.len(), 4);
    assert!(declarations.get("NewMagickWand").is_some());
    assert!(declarations.get("MagickWand").is_none());

    let width = declarations.get("MagickGetImageWidth").unwrap();
    assert_eq!(width.return_type, CType::U64);
    assert_eq!(width.params, vec![CType::Ptr]);

    let names = declarations.names();
    assert_eq!(names.first(), Some(&"MagickGetImageWidth"));
}

#[test]
fn test_probe_pair_exhausts_all_combinations() {
    let err = probe_pair("NoSuchWandLibrary", "NoSuchCoreLibrary").unwrap_err();
    match err {
        FfiError::LibraryNotFound { tried } => {
            assert_eq!(tried, VERSION_SUFFIXES.len() * HDRI_SUFFIXES.len());
        }
        other => panic!("expected LibraryNotFound, got {:?}", other),
    }
}

#[test]
fn test_ffi_error_display() {
    let err = FfiError::LibraryNotFound { tried: 8 };
    assert!(err.to_string().contains("8"));

    let err = FfiError::InvalidArgCount {
        name: "MagickNewImage".to_string(),
        expected: 4,
        got: 2,
    };
    assert!(err.to_string().contains("MagickNewImage"));
    assert!(err.to_string().contains("4"));
    assert!(err.to_string().contains("2"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_libc_call_through_signature() {
    // libc.so.6 is always around on Linux; a miss just skips the test.
    let library = match SharedLibrary::open("libc.so.6") {
        Ok(library) => library,
        Err(_) => return,
    };

    let sig = Signature::new("getpid", vec![], CType::I32);
    let result = library.call(&sig, &[]).expect("getpid call");
    assert_eq!(result.to_word(), std::process::id() as u64);

    // Symbol addresses are cached after the first resolution.
    let first = library.symbol("getpid").unwrap();
    let second = library.symbol("getpid").unwrap();
    assert_eq!(first, second);
}
