//! `define_port_error!`: declares the error enum of a driven port.
//!
//! Every variant carries a `thiserror` message. The macro also generates a
//! snake_case constructor per variant (fields accept anything convertible
//! into the field type) and a `kind()` label used as a structured log field.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };

    (@pattern $variant:ident) => { Self::$variant };
    (@pattern $variant:ident { $($field:ident : $ty:ty),* }) => { Self::$variant { .. } };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Snake-case variant name, stable across message changes.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(
                        define_port_error!(@pattern $variant $( { $($field : $ty),* } )?) => {
                            ::paste::paste! { stringify!([<$variant:snake>]) }
                        }
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        pub enum UploadPortError {
            Unreachable { message: String } => "upload target unreachable: {message}",
            Refused { status: u16, message: String } => "upload refused ({status}): {message}",
            QuotaExceeded => "upload quota exceeded",
        }
    }

    #[rstest]
    fn string_fields_accept_str() {
        let err = UploadPortError::unreachable("dns lookup failed");
        assert_eq!(err.to_string(), "upload target unreachable: dns lookup failed");
    }

    #[rstest]
    fn mixed_fields_keep_their_types() {
        let err = UploadPortError::refused(403_u16, "signature mismatch");
        assert_eq!(err.to_string(), "upload refused (403): signature mismatch");
    }

    #[rstest]
    #[case(UploadPortError::unreachable("x"), "unreachable")]
    #[case(UploadPortError::refused(500_u16, "x"), "refused")]
    #[case(UploadPortError::quota_exceeded(), "quota_exceeded")]
    fn kind_names_the_variant(#[case] err: UploadPortError, #[case] kind: &str) {
        assert_eq!(err.kind(), kind);
    }
}
