//! Shared utility modules.

pub mod sorted_set;
