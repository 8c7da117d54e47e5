pub mod aggregator;
pub mod annotator;
pub mod data;
pub mod fetcher;
pub mod line_evaluator;
pub mod player_directory;
pub mod seasons;
