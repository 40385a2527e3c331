//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the content mixer.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Model
//! - A [`Provider`] names one backend content source
//! - An ordered list of [`ContentConfig`] forms the repeating slot template
//! - A [`ContentProvider`] is the capability that actually produces [`ContentItem`]s
//! - The [`ProviderRegistry`] maps identifiers to capabilities and is immutable once built

mod blueprint;
mod content;
mod error;
mod provider;
mod provider_id;

pub use blueprint::*;
pub use content::*;
pub use error::*;
pub use provider::{ContentProvider, ProviderRegistry, ProviderRegistryBuilder};
pub use provider_id::Provider;
