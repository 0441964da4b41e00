//! Helper macro for declaring driven-port error enums.
//!
//! Every variant carries named fields and a display template. The macro adds
//! a snake_case constructor per variant whose arguments accept anything
//! convertible into the field type, and a `kind` label for structured logs.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),+ },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+

                /// Snake-case name of the variant.
                pub fn kind(&self) -> &'static str {
                    match self {
                        $(Self::$variant { .. } => stringify!([<$variant:snake>]),)+
                    }
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
        pub enum LookupError {
            Offline { host: String } => "lookup host {host} offline",
            Throttled { retry_after: u32 } => "throttled for {retry_after}s",
            Partial { query: String, found: u32 } => "'{query}' matched {found} of many",
        }
    }

    #[rstest]
    fn string_fields_take_borrowed_text() {
        let err = LookupError::offline("geo.local");
        assert_eq!(err.to_string(), "lookup host geo.local offline");
        assert_eq!(err, LookupError::Offline { host: "geo.local".into() });
    }

    #[rstest]
    #[case(LookupError::throttled(30_u32), "throttled", "throttled for 30s")]
    #[case(LookupError::partial("Goa", 2_u32), "partial", "'Goa' matched 2 of many")]
    fn kind_and_message_follow_the_variant(
        #[case] err: LookupError,
        #[case] kind: &str,
        #[case] message: &str,
    ) {
        assert_eq!(err.kind(), kind);
        assert_eq!(err.to_string(), message);
    }
}
