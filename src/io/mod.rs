pub mod classifier;
pub mod fields;
pub mod input_reader;
pub mod loader;
pub mod output_reader;
pub mod stream;
