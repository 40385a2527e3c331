//! # Providers
//!
//! Built-in content provider capabilities and the registry factory.
//!
//! - [`SampleProvider`]: generates as many items as requested
//! - [`ScriptedProvider`]: injectable failure, latency and under-delivery, with a call counter
//! - [`build_registry`]: turns `[[providers]]` configuration into a `ProviderRegistry`

mod factory;
mod sample;
mod scripted;

pub use factory::build_registry;
pub use sample::SampleProvider;
pub use scripted::ScriptedProvider;
