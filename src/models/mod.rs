pub mod assessment;
pub mod record;

pub use assessment::*;
pub use record::*;
