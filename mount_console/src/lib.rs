pub mod app;
pub mod config;
pub mod indi_handler;
pub mod model;
pub mod sim_mount;
pub mod terminal;
