#![deny(warnings)]
pub mod error;
pub mod model;
pub mod providers;
pub mod scoring;
pub mod upgrade;

pub use error::CoreError;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "royale-advisor"
    }

    pub const fn codename() -> &'static str {
        "Card Valuation Engine"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
