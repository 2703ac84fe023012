//! Controller layer: view-state transitions and user-facing error modeling.

pub mod events;
pub mod reducer;
