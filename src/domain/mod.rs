// Domain layer: the reconciliation engine, its models and the ports the pipeline talks through.
// Nothing in here touches the filesystem.

pub mod model;
pub mod ports;

pub mod services;
