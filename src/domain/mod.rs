// Domain layer: request scope model and the request port. No I/O here.

pub mod model;
pub mod ports;
