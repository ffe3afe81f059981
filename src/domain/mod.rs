// Domain layer: core models, wire shapes of the inference call, and ports.

pub mod inference;
pub mod model;
pub mod ports;
