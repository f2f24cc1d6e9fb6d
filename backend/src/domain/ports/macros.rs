//! Repository error enums.
//!
//! Every repository port fails the same two ways (the store is unreachable,
//! or a statement failed) and some add conflict variants of their own.
//! [`define_port_error!`] writes the shared variants and a snake_case
//! constructor per variant.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident for $store:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            /// The backing store could not be reached.
            #[error("{store} connection failed: {message}", store = $store)]
            Connection { message: String },
            /// A statement failed while executing.
            #[error("{store} query failed: {message}", store = $store)]
            Query { message: String },
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant,
            )*
        }

        impl $name {
            pub fn connection(message: impl Into<String>) -> Self {
                Self::Connection { message: message.into() }
            }

            pub fn query(message: impl Into<String>) -> Self {
                Self::Query { message: message.into() }
            }

            $(
                ::paste::paste! {
                    pub fn [<$variant:snake>]() -> Self {
                        Self::$variant
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;
