//! Shopify Admin GraphQL adapter for the storefront side.

mod client;
mod queries;

pub use client::{ShopifyClient, MAX_PAGES, PAGE_SIZE};
