//! Link preview enrichment.
//!
//! This crate provides:
//! - [`resolvers`] - the [`MetadataResolver`] trait, built-in resolvers and
//!   the ordered [`ResolverChain`]
//! - [`engine`] - [`Enricher`], which resolves batches of URLs concurrently

pub mod engine;
pub mod resolvers;

pub use engine::Enricher;
pub use resolvers::{
    MetadataResolver, MetadataServiceResolver, PageMetaResolver, ResolverChain, parse_page_meta,
    redirect_policy,
};
