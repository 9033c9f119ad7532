// Domain layer: OCPI session/endpoint models and the transport port.

pub mod model;
pub mod ports;
