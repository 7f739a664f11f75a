pub mod holding;
pub mod quote;
pub mod rate;
pub mod realized;
pub mod summary;
