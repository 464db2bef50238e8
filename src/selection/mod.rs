pub mod partition;
pub mod weighted;

pub use partition::{Interval, Partition};
pub use weighted::{RandomSource, ThreadRngSource, WeightedSelector};
