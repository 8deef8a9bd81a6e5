mod iter;
mod string;

pub use iter::*;
pub use string::*;
