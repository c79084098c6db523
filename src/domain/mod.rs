// Domain layer: port profiles, wire bodies and the configuration port.

pub mod model;
pub mod ports;
