// Domain layer: core models and ports (interfaces). No external dependencies beyond std, serde and async-trait.

pub mod model;
pub mod ports;
