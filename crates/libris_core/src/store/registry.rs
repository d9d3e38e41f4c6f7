//! Type tags a store knows how to reconstruct.
//!
//! # Invariants
//! - Scalar tags (`bool`, `i32`, `i64`, `u32`, `u64`, `f64`, `string`) are
//!   always known.
//! - `seq<T>` and `map<T>` are known exactly when `T` is known.
//! - Any other tag is known only after `register` added it.

use super::Storable;
use std::collections::BTreeSet;

const SCALAR_TAGS: [&str; 7] = ["bool", "i32", "i64", "u32", "u64", "f64", "string"];

/// Set of type tags accepted on read and write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    custom: BTreeSet<String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `T::type_tag()` to the known tags.
    pub fn register<T: Storable>(&mut self) {
        self.custom.insert(T::type_tag().into_owned());
    }

    /// Returns whether a value tagged `tag` can be reconstructed.
    pub fn recognizes(&self, tag: &str) -> bool {
        if let Some(inner) = container_element(tag, "seq<").or_else(|| container_element(tag, "map<"))
        {
            return self.recognizes(inner);
        }
        SCALAR_TAGS.contains(&tag) || self.custom.contains(tag)
    }
}

fn container_element<'a>(tag: &'a str, prefix: &str) -> Option<&'a str> {
    tag.strip_prefix(prefix)?.strip_suffix('>')
}
