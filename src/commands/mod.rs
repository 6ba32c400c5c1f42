mod merge;
mod order;

pub use merge::merge;
pub use order::order;
