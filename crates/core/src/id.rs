// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes.
//!
//! Runs and commands are named by the robot; sessions are minted locally so
//! that several clients watching the same run can tell each other apart in
//! the ownership record.

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Define a newtype ID wrapper around `SmolStr`.
///
/// Two forms:
/// - `pub struct RunId;` for identifiers assigned by the robot. Only
///   `new(impl Into<SmolStr>)` is generated.
/// - `pub struct SessionId("ses-");` for locally minted identifiers.
///   Adds `PREFIX`, `generate()` (`{prefix}{nanoid}`) and `suffix()`.
///
/// Both forms get `as_str()`, `short()`, `Display`, `From<&str>`,
/// `From<String>`, `PartialEq<str>`, `PartialEq<&str>`, `Borrow<str>` and
/// transparent serde.
#[macro_export]
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($prefix:literal);
    ) => {
        $crate::define_id! {
            $(#[$meta])*
            pub struct $name;
        }

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            /// Generate a new random ID with the type prefix
            pub fn generate() -> Self {
                Self(smol_str::SmolStr::new(format!(
                    "{}{}",
                    Self::PREFIX,
                    nanoid::nanoid!(19)
                )))
            }

            /// Get the ID suffix (without prefix)
            pub fn suffix(&self) -> &str {
                self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
            }
        }
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub smol_str::SmolStr);

        impl $name {
            pub fn new(id: impl Into<smol_str::SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the ID truncated to at most `n` characters.
            pub fn short(&self, n: usize) -> &str {
                $crate::id::short(&self.0, n)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
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

define_id! {
    /// Identifier of a protocol run on the robot.
    pub struct RunId;
}

define_id! {
    /// Identifier of a command within a run.
    pub struct CommandId;
}

define_id! {
    /// One client session observing a run. Used as the owner key of the
    /// takeover lease.
    pub struct SessionId("ses-");
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
