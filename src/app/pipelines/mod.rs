pub mod transcript_pipeline;
