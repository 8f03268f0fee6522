pub mod config;
pub mod data;
pub mod geo;
pub mod hash;
pub mod labels;
