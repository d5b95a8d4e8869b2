// Domain layer: type metadata model and ports (traits at the seams).

pub mod model;
pub mod ports;
