mod calculation;
mod health_insurer;
mod region;
mod tax_class;

pub use calculation::{CalculationInput, CalculationResult, TaxEngineResult};
pub use health_insurer::{HealthInsurer, InsurerCoverage, InsurerRates};
pub use region::Region;
pub use tax_class::TaxClass;
