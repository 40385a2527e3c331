//! Slot sequencer
//!
//! Expands the cyclic slot template into one entry per requested position.

use std::sync::Arc;

use contracts::{ContentConfig, ContractError};

use crate::ContentError;

/// A validated `(count, offset)` request window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestWindow {
    pub count: usize,
    pub offset: usize,
}

impl RequestWindow {
    /// Validate raw caller input
    ///
    /// # Errors
    /// `count <= 0`, `offset < 0`, or `count + offset` above `max_slots`.
    pub fn new(count: i64, offset: i64, max_slots: usize) -> Result<Self, ContentError> {
        if count <= 0 {
            return Err(ContentError::validation("count", "must be positive"));
        }
        if offset < 0 {
            return Err(ContentError::validation("offset", "must be positive or zero"));
        }

        let count = usize::try_from(count)
            .map_err(|_| ContentError::validation("count", "is too large"))?;
        let offset = usize::try_from(offset)
            .map_err(|_| ContentError::validation("offset", "is too large"))?;
        if count > max_slots {
            return Err(ContentError::validation("count", "is too large"));
        }
        match count.checked_add(offset) {
            Some(slots) if slots <= max_slots => {}
            _ => return Err(ContentError::validation("offset", "is too large")),
        }

        Ok(Self { count, offset })
    }

    /// Number of slots to resolve: `count + offset`
    pub fn slots(&self) -> usize {
        self.count + self.offset
    }
}

/// Repeating slot template
#[derive(Debug, Clone)]
pub struct SlotSequencer {
    configs: Arc<[ContentConfig]>,
}

impl SlotSequencer {
    /// # Errors
    /// An empty template.
    pub fn new(configs: Vec<ContentConfig>) -> Result<Self, ContentError> {
        if configs.is_empty() {
            return Err(ContractError::config_validation(
                "slots",
                "at least one slot must be configured",
            )
            .into());
        }
        Ok(Self {
            configs: configs.into(),
        })
    }

    pub fn configs(&self) -> &[ContentConfig] {
        &self.configs
    }

    /// Slot `i` is bound to `configs[i % configs.len()]`, for `i` in `0..count+offset`
    pub fn expand(&self, window: RequestWindow) -> Vec<&ContentConfig> {
        self.configs.iter().cycle().take(window.slots()).collect()
    }
}
