// Adapters layer: concrete drivers for external systems.

pub mod http;
