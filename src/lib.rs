/// Abstraction over the file system used to resolve companion files.
pub mod fs;
/// Multi-file model loading: companion discovery and aggregation.
pub mod loader;
/// Parser for the GoldSrc studio model container format.
pub mod mdl;
/// Shared winnow-based parsing utilities.
pub mod parser_utils;
