pub mod deriver;
pub mod summary;

pub use deriver::MetricsDeriver;
