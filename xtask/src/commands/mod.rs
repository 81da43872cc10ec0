//! Command families exposed through `cargo xtask`.

pub mod build;
pub mod catalogue;
pub mod pages;
pub mod sitemap;
