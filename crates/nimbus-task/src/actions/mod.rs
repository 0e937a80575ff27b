//! Built-in actions.

pub mod create_vpc;
pub mod target_weight;
