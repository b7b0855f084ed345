//! Brew Orders Domain Concerns

pub mod orders;
pub mod products;
