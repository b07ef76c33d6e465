pub mod paper;
pub mod smartapi;
