// Application layer - Plot pipeline components and the controllers that own them
pub mod controls;
pub mod data_source;
pub mod fetcher;
pub mod hovmoller_controller;
pub mod plot;
pub mod plot_view;
pub mod preferences;
pub mod registry;
pub mod renderer;
pub mod selection_model;
pub mod timeseries_controller;

#[cfg(test)]
pub mod test_support;
