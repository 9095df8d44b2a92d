pub mod birthday;
pub mod calendar;
pub mod config;
pub mod credentials;
pub mod render;
pub mod runner;
pub mod utils;
