pub mod actions;
pub mod cycle_risk;
pub mod directory;
pub mod memory;
pub mod storage;
pub mod trajectory;
