pub mod gate;
pub mod report;
pub mod service;
