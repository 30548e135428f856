//! Declaration Registry
//!
//! Scans the reduced declaration file and indexes every function
//! prototype it can recognize. Lines that are not prototypes (typedefs,
//! enum and struct bodies, variables) are skipped silently.

use std::collections::HashMap;

use super::types::Signature;

/// Parsed function declarations, indexed by name
#[derive(Debug, Default)]
pub struct Declarations {
    functions: HashMap<String, Signature>,
}

impl Declarations {
    /// Parse a reduced declaration file
    pub fn parse(header: &str) -> Self {
        let mut functions = HashMap::new();
        for line in header.lines() {
            if let Some(signature) = Signature::parse_prototype(line) {
                functions.insert(signature.name.clone(), signature);
            }
        }
        Self { functions }
    }

    /// Look up a function signature by name
    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    /// Number of indexed functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check whether the scan found anything at all
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// List all function names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
