pub mod diff;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod oncall;
pub mod render;
pub mod store;
