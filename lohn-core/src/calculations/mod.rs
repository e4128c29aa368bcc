//! Payroll calculations: the statutory wage-tax engines and the net-salary
//! calculator built on top of them.

pub mod common;
pub mod net_salary;
pub mod wage_tax;

pub use net_salary::{CalculationError, ContributionRates, NetSalaryCalculator};
pub use wage_tax::{
    Pap2025, PayPeriod, StatutoryFlags, WageTaxEngine, WageTaxError, WageTaxOutcome,
    WageTaxRegistry, WageTaxRequest,
};
