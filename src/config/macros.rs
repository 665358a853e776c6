//! Configuration macros for zero-repetition config definitions
//!
//! This module provides the `config_struct!` macro that allows defining
//! configuration structures with embedded defaults in a single declaration.

/// Define a configuration struct with embedded defaults
///
/// Each field is declared once with its type and default value, and the
/// macro generates:
/// - The struct with public fields
/// - The Default implementation
/// - Serde support with `#[serde(default)]` so partial files load
///
/// # Example
/// ```
/// donationkit::config_struct! {
///     pub struct ExampleConfig {
///         max_size: usize = 1000,
///         enabled: bool = true,
///     }
/// }
///
/// assert_eq!(ExampleConfig::default().max_size, 1000);
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
