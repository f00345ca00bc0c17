pub mod wind_correlation;

pub use wind_correlation::WindCorrelation;
