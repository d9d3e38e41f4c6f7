//! Type-tagged payload container returned by untyped reads.
//!
//! # Responsibility
//! - Pair a serialized payload with the tag of the type that produced it.
//! - Gate extraction on the tag so callers never decode a payload as the
//!   wrong type.
//!
//! # Invariants
//! - A `StoredValue` built from `T` carries exactly `T::type_tag()`.
//! - `downcast::<T>()` succeeds only when the stored tag equals
//!   `T::type_tag()` and the payload decodes as `T`.

use super::finite::ensure_finite_floats;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A value that can be written by an `ObjectStore`.
///
/// `type_tag` must be stable across releases: it is persisted next to the
/// payload and compared on every typed read.
pub trait Storable: Serialize + DeserializeOwned {
    fn type_tag() -> Cow<'static, str>;
}

macro_rules! storable_scalar {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(
            impl Storable for $ty {
                fn type_tag() -> Cow<'static, str> {
                    Cow::Borrowed($tag)
                }
            }
        )*
    };
}

storable_scalar! {
    bool => "bool",
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    f64 => "f64",
    String => "string",
}

impl<T: Storable> Storable for Vec<T> {
    fn type_tag() -> Cow<'static, str> {
        Cow::Owned(format!("seq<{}>", T::type_tag()))
    }
}

impl<T: Storable> Storable for BTreeMap<String, T> {
    fn type_tag() -> Cow<'static, str> {
        Cow::Owned(format!("map<{}>", T::type_tag()))
    }
}

/// One persisted value plus the tag of its original type.
///
/// This is the whole on-disk document: `{"type": "...", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredValue {
    #[serde(rename = "type")]
    type_tag: String,
    value: serde_json::Value,
}

impl StoredValue {
    /// Captures `value` together with its type tag.
    ///
    /// # Errors
    /// - Returns the serializer error when `value` has no exact JSON
    ///   representation: NaN or infinite floats, maps with non-string keys.
    pub fn new<T: Storable>(value: &T) -> Result<Self, serde_json::Error> {
        ensure_finite_floats(value)?;
        Ok(Self {
            type_tag: T::type_tag().into_owned(),
            value: serde_json::to_value(value)?,
        })
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Raw payload, for callers that inspect values without a concrete type.
    pub fn payload(&self) -> &serde_json::Value {
        &self.value
    }

    /// Returns whether this value was stored as `T`.
    pub fn is<T: Storable>(&self) -> bool {
        self.type_tag == T::type_tag()
    }

    /// Extracts the payload as `T` after checking the stored tag.
    pub fn downcast<T: Storable>(self) -> Result<T, DowncastError> {
        let expected = T::type_tag();
        if self.type_tag != expected {
            return Err(DowncastError::TypeMismatch {
                expected: expected.into_owned(),
                found: self.type_tag,
            });
        }

        serde_json::from_value(self.value).map_err(|source| DowncastError::Payload {
            type_tag: self.type_tag,
            source,
        })
    }
}

/// Failure to extract a concrete type from a `StoredValue`.
#[derive(Debug)]
pub enum DowncastError {
    TypeMismatch {
        expected: String,
        found: String,
    },
    Payload {
        type_tag: String,
        source: serde_json::Error,
    },
}

impl DowncastError {
    /// Stable short code for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::Payload { .. } => "payload_invalid",
        }
    }
}

impl Display for DowncastError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected `{expected}`, found `{found}`")
            }
            Self::Payload { type_tag, source } => {
                write!(f, "payload tagged `{type_tag}` does not decode: {source}")
            }
        }
    }
}

impl Error for DowncastError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TypeMismatch { .. } => None,
            Self::Payload { source, .. } => Some(source),
        }
    }
}
