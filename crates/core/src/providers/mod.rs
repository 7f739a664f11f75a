pub mod cors_proxy;
pub mod registry;
pub mod simulated;
pub mod traits;
pub mod yahoo_chart;
