pub mod config;
pub mod error;
pub mod grant;
pub mod model;
pub mod plan;
pub mod rates;
pub mod web;

pub use error::{Error, Result};
pub use grant::{compute_grant, GrantBreakdown, GrantRequest};
pub use model::{CropType, ProgramMode, ProgramType, WaterEfficiencyClass, WateringMethod};
pub use plan::{FarmPlan, Quote};
pub use rates::{compute_rate, RateCard};
