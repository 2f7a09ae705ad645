pub mod processor;

pub use processor::{RiskProcessor, RiskReport};
