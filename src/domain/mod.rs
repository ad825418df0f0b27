// Domain layer: the contact record and the ports the pipeline depends on.

pub mod model;
pub mod ports;
