//! `define_port_error!`: error enums for driven ports.
//!
//! Each variant is declared with its fields and a `thiserror` message. The
//! macro derives the enum and adds one snake-case constructor per variant;
//! struct-variant constructors take every field as `impl Into<T>` so call
//! sites can pass `&str` for `String` fields.

macro_rules! define_port_error {
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
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    define_port_error! {
        pub enum StreamPortError {
            Offline => "stream provider offline",
            Rejected { message: String } => "stream provider rejected the request: {message}",
            Throttled { retry_after_secs: u32 } => "throttled for {retry_after_secs}s",
            Partial { message: String, uploaded: u32 } => "{message} after {uploaded} chunks",
        }
    }

    #[rstest]
    #[case(StreamPortError::offline(), "stream provider offline")]
    #[case(
        StreamPortError::rejected("bad token"),
        "stream provider rejected the request: bad token"
    )]
    #[case(StreamPortError::throttled(30_u32), "throttled for 30s")]
    #[case(StreamPortError::partial("connection reset", 3_u32), "connection reset after 3 chunks")]
    fn constructors_render_their_messages(#[case] error: StreamPortError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn constructors_accept_owned_and_borrowed_strings() {
        assert_eq!(
            StreamPortError::rejected("bad token"),
            StreamPortError::rejected(String::from("bad token"))
        );
    }
}
