pub mod catalog;
pub mod csv;
pub mod file_processor;
pub mod planning;
pub mod simulation;
pub mod upload_workflow;
