//! Signal primitives applied to whole masked arrays.

pub mod align;
pub mod headings;
pub mod hysteresis;
pub mod interleave;
pub mod mask;
pub mod rate;
pub mod stack;

pub use align::{align, align_channel};
pub use headings::straighten_headings;
pub use hysteresis::hysteresis;
pub use interleave::interleave;
pub use mask::{repair_mask, repair_mask_in_place};
pub use rate::rate_of_change;
pub use stack::{vstack_params, StackedParams};
