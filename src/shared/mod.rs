//! Layer-neutrale Hilfstypen: Raum-Transformationen, Bounds, Achsen-Maske.

pub mod axis;
pub mod bounds;
pub mod space;

pub use axis::AxisMask;
pub use bounds::Bounds;
pub use space::{Space, Transform};
