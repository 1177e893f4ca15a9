//! Amazon-specific modules for HTTP client, parsing, and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{Storefront, StorefrontClient};
pub use models::{Book, Listing};
pub use parser::{extract, BlockOutcome, Parser};
