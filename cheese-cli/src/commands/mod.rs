pub mod capture;
pub mod plugin;
