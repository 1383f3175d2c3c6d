// Adapters layer: converts between the portal's files and the domain model.

pub mod ingest;
pub mod report;
