// Presentation layer - HTTP control surface for the plot views
pub mod app_state;
pub mod handlers;
