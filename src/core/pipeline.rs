pub use crate::app::pipelines::transcript_pipeline::TranscriptPipeline;
