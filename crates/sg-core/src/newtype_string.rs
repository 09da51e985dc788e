//! Macro for defining strongly-typed name newtypes.
//!
//! Record type names and storage names share one invariant (non-empty) and
//! are used as map keys throughout graph construction, so both get the same
//! borrowing impls.

/// Define a non-empty string newtype usable as a `HashMap` key looked up by `&str`.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            /// Create a name, failing with [`CoreError::EmptyName`](crate::CoreError::EmptyName)
            /// when `name` is empty.
            pub fn try_new(name: impl Into<String>) -> $crate::error::CoreResult<Self> {
                let s = name.into();
                if s.is_empty() {
                    Err($crate::error::CoreError::EmptyName {
                        context: stringify!($Name).to_string(),
                    })
                } else {
                    Ok(Self(s))
                }
            }

            /// Create a name from a compile-time constant.
            ///
            /// Panics in debug builds if the constant is empty.
            pub fn from_static(name: &'static str) -> Self {
                debug_assert!(!name.is_empty(), concat!(stringify!($Name), " must not be empty"));
                Self(name.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_name;
