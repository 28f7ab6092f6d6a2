pub mod form;
pub mod i18n;
pub mod prelude;
#[cfg(feature = "gpui")]
pub mod surface;
