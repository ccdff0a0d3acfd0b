pub mod elements;
pub mod profile;
