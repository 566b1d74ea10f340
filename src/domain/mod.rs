// Domain layer - Plot selections, series and presentation settings
pub mod figure;
pub mod selection;
pub mod series;
pub mod variable;
