pub mod browser;
pub mod cascade;
pub mod oddschecker;
