//! API clients for external services
//!
//! - titrari.ro: Romanian subtitle search via HTML scraping

pub mod titrari;

pub use titrari::{SearchRow, TitrariClient, TitrariError};
