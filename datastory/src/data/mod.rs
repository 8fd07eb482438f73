/// Raw CSV datasets and typed measure tables.
pub mod dataset;
/// `(Country, Year)` join.
pub mod join;
/// Parallel loading of all configured sources.
pub mod load;
/// Canonical measure and column names.
pub mod schema;
