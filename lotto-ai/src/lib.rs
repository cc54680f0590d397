pub mod analysis;
pub mod display;
pub mod export;
pub mod features;
pub mod sampler;
pub mod score;
pub mod store;
pub mod weights;
