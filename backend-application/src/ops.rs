pub mod click_accumulator;
pub mod sweeping_cache;

pub use click_accumulator::ClickAccumulator;
pub use sweeping_cache::SweepingCache;
