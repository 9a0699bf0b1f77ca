pub mod assembler;
pub mod types;

pub use assembler::{FeatureAssembler, FeatureDefaults};
pub use types::{AttributeError, FeatureVector, RequestAttributes};
