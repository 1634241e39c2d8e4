pub mod normalize;
pub mod steps;
