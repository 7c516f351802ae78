pub mod distribution;
pub mod export;
pub mod live;
pub mod maintenance;
pub mod rankings;
pub mod searches;
pub mod timeseries;
