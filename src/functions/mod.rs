pub mod primitives;
pub mod registry;

pub use primitives::{MathFunction, Operation, CATALOG};
pub use registry::GeneRegistry;
