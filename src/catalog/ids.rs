/// Declares a closed id enumeration with lookup by numeric id and by name.
///
/// Values outside the enumeration are represented as `None` by `from_id`;
/// callers keep the raw id alongside so unknown ids survive re-encoding.
macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $($variant:ident = $value:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[repr($repr)]
        $vis enum $name {
            $($variant = $value),*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            pub fn from_id(id: $repr) -> Option<Self> {
                match id {
                    $($value => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn id(self) -> $repr {
                self as $repr
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            /// Case-insensitive name lookup
            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.name().eq_ignore_ascii_case(name))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.name())
            }
        }
    };
}

pub(crate) use id_enum;
