pub mod analysis;
pub mod restaurant;
