//! Error handling foundation for textlens.
//!
//! Only the `Result` alias lives here. Each crate owns its error enums and
//! wraps them in a rootcause [`Report`] where a failure crosses a crate
//! boundary (client construction, configuration, startup).

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
