/// Parametrized line, scatter and bar chart builders.
pub mod build;
/// Scene descriptors: render and annotation functions.
pub mod descriptor;
/// JSON story definition and validation.
pub mod story;
