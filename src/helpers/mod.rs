pub mod analysis_input;
pub mod handler_404;
