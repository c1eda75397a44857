// Domain layer: document model and the driver/adapter ports.

pub mod model;
pub mod ports;
