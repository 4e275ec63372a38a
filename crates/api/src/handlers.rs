pub mod assistant;
pub mod health;
pub mod lead;
