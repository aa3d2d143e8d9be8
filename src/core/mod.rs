//! Reference data, the calculation engine and report rendering

pub mod config;
pub mod engine;
pub mod index;
pub mod log;
pub mod reference;
pub mod report;

// Re-export main types for cleaner imports
pub use engine::{CalculationFailure, CalculationRequest, CalculationResult, RiskRating, evaluate};
pub use index::ReferenceIndex;
pub use reference::{
    Collection, ConversionRatio, ProductType, ReferenceData, ReferenceRecord, RiskFlag, RiskLevel,
    YieldRecord,
};
pub use report::format_report;
