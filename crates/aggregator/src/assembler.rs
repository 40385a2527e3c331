//! Result assembler
//!
//! Keeps the longest prefix of filled slots, then applies the offset window.

use contracts::ContentItem;

use crate::round::SlotOutcome;

/// Final response of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    /// Items inside the requested window, in slot order
    pub items: Vec<ContentItem>,
    /// Absolute position of the first unresolved slot, if any
    pub truncated_at: Option<usize>,
}

/// Merge slot outcomes into the response
///
/// Truncation is computed over the full `count + offset` sequence first;
/// the window `[offset..]` is applied afterwards. An offset at or beyond the
/// truncation point yields an empty list, not an error.
pub fn assemble(outcomes: Vec<SlotOutcome>, offset: usize) -> Assembled {
    let mut items = Vec::with_capacity(outcomes.len());
    let mut truncated_at = None;

    for (position, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            SlotOutcome::Filled(item) => items.push(item),
            SlotOutcome::Failed(_) => {
                truncated_at = Some(position);
                break;
            }
        }
    }

    let items = if offset >= items.len() {
        Vec::new()
    } else {
        items.split_off(offset)
    };

    Assembled {
        items,
        truncated_at,
    }
}
