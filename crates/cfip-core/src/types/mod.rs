mod candidate;
mod region;
mod source;

pub use candidate::*;
pub use region::*;
pub use source::*;
