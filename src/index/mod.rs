mod membership_index;

pub use membership_index::*;
