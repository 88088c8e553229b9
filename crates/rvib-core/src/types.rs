use std::fmt;

use serde::{Deserialize, Serialize};

/// Target ANN engine (`"faiss"`, ...), carried on the wire as a plain
/// string in `RemoteBuildRequest.engine`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Engine(String);

/// Distance metric (`"l2"`, `"innerproduct"`, ...), carried on the wire
/// as `index_parameters.space_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceType(String);

/// Index algorithm (`"hnsw"`, ...), carried on the wire as
/// `index_parameters.algorithm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Algorithm(String);

macro_rules! string_newtype_impls {
    ($name:ident) => {
        impl $name {
            /// Borrows the underlying wire token.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_newtype_impls!(Engine);
string_newtype_impls!(SpaceType);
string_newtype_impls!(Algorithm);
