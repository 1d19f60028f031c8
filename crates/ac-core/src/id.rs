// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed opaque identifiers for internal correlation.
//!
//! Session identity itself is the Kubernetes `(namespace, name)` pair and is
//! never wrapped here — these IDs exist only for values that have no
//! natural external name, such as an inbox message file or a single
//! reconcile attempt's trace correlation.

/// Define a newtype ID wrapper with a type prefix, backed by a UUIDv4 suffix.
///
/// ```ignore
/// define_id! {
///     /// Doc comment for the ID type.
///     pub struct ReconcileAttemptId("ra-");
/// }
/// ```
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random ID with the type prefix.
            pub fn new() -> Self {
                Self(format!("{}{}", Self::PREFIX, uuid::Uuid::new_v4()))
            }

            /// Create an ID from an existing string (parsing/deserialization).
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from_string(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::from_string(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

crate::define_id! {
    /// Correlates the set of log lines produced by a single reconcile pass
    /// over one session, across async worker-pool boundaries.
    pub struct ReconcileAttemptId("ra-");
}

crate::define_id! {
    /// Names an inbox file: `<stateDir>/inbox/<monotonic-ts>-<id>.json`.
    pub struct InboxMessageId("im-");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_carry_prefix_and_are_unique() {
        let a = ReconcileAttemptId::new();
        let b = ReconcileAttemptId::new();
        assert!(a.as_str().starts_with("ra-"));
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_through_display_and_from_string() {
        let id = InboxMessageId::new();
        let s = id.to_string();
        let back = InboxMessageId::from_string(s.clone());
        assert_eq!(back.as_str(), s);
    }
}
