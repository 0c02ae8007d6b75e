// The infra module contains implementations of core traits.
// Each external service gets its own submodule.

#[path = "google/mod.rs"]
pub mod google;

#[path = "ai/mod.rs"]
pub mod ai;
