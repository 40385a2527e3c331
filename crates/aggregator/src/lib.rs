//! # Aggregator
//!
//! Answers "give me `count` items starting at position `offset`" by drawing
//! from several providers according to a repeating slot template.
//!
//! Pipeline per request:
//! 1. [`sequencer`] expands the template to `count + offset` slots
//! 2. [`fallback`] runs the primary round, then at most one fallback round,
//!    each through the [`round`] dispatcher (one fetch per provider per round)
//! 3. every wait happens under one [`deadline::Deadline`]
//! 4. [`assembler`] truncates at the first unresolved slot and applies the offset window
//!
//! ```ignore
//! let service = ContentService::build(configs, registry, Duration::from_secs(5))?;
//! let items = service.get_content("10.0.0.1", 10, 2).await?;
//! ```

pub mod assembler;
pub mod deadline;
pub mod error;
pub mod fallback;
pub mod round;
pub mod sequencer;
pub mod service;

pub use assembler::{assemble, Assembled};
pub use contracts::{ContentConfig, ContentItem, ContentProvider, Provider, ProviderRegistry};
pub use deadline::Deadline;
pub use error::ContentError;
pub use round::{SlotFailure, SlotOutcome};
pub use sequencer::{RequestWindow, SlotSequencer};
pub use service::ContentService;
