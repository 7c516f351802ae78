pub mod businesses;
pub mod collect;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod live;
pub mod maintenance;
