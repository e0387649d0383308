pub mod communication;
pub mod config;
pub mod controller;
pub mod error;
pub mod hostname;
pub mod logging;
pub mod report;
