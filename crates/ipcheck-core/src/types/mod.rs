mod scan;
mod verdict;

pub use scan::*;
pub use verdict::*;
