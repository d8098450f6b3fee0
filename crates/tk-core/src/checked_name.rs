//! Validated string newtypes for migration and table names.

/// Define a string newtype whose values pass `$check`.
///
/// `$check` returns `None` for an acceptable name or the reason it is
/// refused. Serde goes through the same check, so a config file cannot
/// smuggle in a name the constructors would refuse. Names order lexically.
macro_rules! checked_name {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident($kind:literal) checked by $check:path;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        $vis struct $Name(String);

        impl $Name {
            /// Name from a literal known to be valid.
            ///
            /// Panics on an invalid name; use [`parse`](Self::parse) for
            /// anything read at runtime.
            pub fn new(name: impl Into<String>) -> Self {
                match Self::parse(name) {
                    Ok(name) => name,
                    Err(err) => panic!("{err}"),
                }
            }

            pub fn parse(name: impl Into<String>) -> Result<Self, $crate::error::InvalidName> {
                let value = name.into();
                match $check(&value) {
                    None => Ok(Self(value)),
                    Some(reason) => Err($crate::error::InvalidName {
                        kind: $kind,
                        value,
                        reason,
                    }),
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $Name {
            type Error = $crate::error::InvalidName;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$Name> for String {
            fn from(name: $Name) -> String {
                name.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

pub(crate) use checked_name;
