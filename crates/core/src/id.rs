// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes

/// Define a newtype ID wrapper around `String`.
///
/// Generates `new()`, `as_str()`, `Display`, `From<String>`, `From<&str>`,
/// `PartialEq<str>`, `PartialEq<&str>`, and `Borrow<str>` implementations.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct MyId;
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Prefix the resource manager puts on every application id.
pub const APPLICATION_ID_PREFIX: &str = "application_";

define_id! {
    /// Cluster-assigned identifier of a submitted application,
    /// e.g. `application_1700000000000_0042`.
    pub struct ApplicationId;
}

define_id! {
    /// Address of one resource-manager endpoint (`host:port`).
    pub struct Endpoint;
}

impl ApplicationId {
    /// Build the canonical id from the cluster start timestamp and sequence.
    pub fn from_parts(cluster_timestamp: u64, sequence: u32) -> Self {
        Self(format!(
            "{}{}_{:04}",
            APPLICATION_ID_PREFIX, cluster_timestamp, sequence
        ))
    }

    /// Sequence number portion of the id, if it follows the canonical format.
    pub fn sequence(&self) -> Option<u32> {
        self.0
            .strip_prefix(APPLICATION_ID_PREFIX)?
            .rsplit_once('_')?
            .1
            .parse()
            .ok()
    }

    /// Id with the `application_` prefix removed.
    ///
    /// Some external schedulers scrape launcher logs for that prefix and
    /// kill whatever they find; detached launches log this form instead.
    pub fn without_prefix(&self) -> &str {
        self.0
            .strip_prefix(APPLICATION_ID_PREFIX)
            .unwrap_or(&self.0)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
