pub mod display;
pub mod gateway;
pub mod listing;
pub mod metadata;
pub mod workflow;
