//! The calculator session: form state, the last result, and the history.
//!
//! Every form edit recalculates immediately. All failures end up here and
//! become an inline message; none of them ends the session.

use std::path::Path;
use std::sync::Arc;

use lohn_core::calculations::{CalculationError, NetSalaryCalculator, WageTaxEngine};
use lohn_core::{
    CalculationInput, CalculationResult, InsurerRepository, Region, RepositoryError, TaxClass,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::{self, ExportError, ExportFormat};
use crate::form::FormState;
use crate::history::{HistoryEntry, HistoryLedger};
use crate::utils::{ParseDecimalError, parse_decimal};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Bruttogehalt fehlt")]
    MissingGross,

    #[error("Bruttogehalt ungültig: {0}")]
    InvalidGross(#[from] ParseDecimalError),

    #[error("Keine Krankenkasse für {0} ausgewählt")]
    MissingRate(Region),

    #[error("Unbekannte Krankenkasse: {0}")]
    UnknownInsurer(String),

    #[error("Krankenkassen konnten nicht geladen werden: {0}")]
    Lookup(#[from] RepositoryError),

    #[error("Berechnung fehlgeschlagen: {0}")]
    Calculation(#[from] CalculationError),

    #[error("Export fehlgeschlagen: {0}")]
    Export(#[from] ExportError),
}

/// What the result line of the form shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    /// Nothing entered yet.
    #[default]
    Idle,
    Computed(CalculationResult),
    /// The last attempt failed; the previous result is cleared.
    Failed(String),
}

impl FormStatus {
    pub fn result(&self) -> Option<&CalculationResult> {
        match self {
            Self::Computed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

pub struct Session {
    repo: Box<dyn InsurerRepository>,
    engine: Arc<dyn WageTaxEngine>,
    calculator: NetSalaryCalculator,
    form: FormState,
    status: FormStatus,
    history: HistoryLedger,
}

impl Session {
    /// Starts a session and loads the insurers of the default region.
    pub async fn open(
        repo: Box<dyn InsurerRepository>,
        engine: Arc<dyn WageTaxEngine>,
        calculator: NetSalaryCalculator,
    ) -> Self {
        let mut session = Self {
            repo,
            engine,
            calculator,
            form: FormState::default(),
            status: FormStatus::Idle,
            history: HistoryLedger::new(),
        };
        session.refresh_insurers().await;
        session
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    pub fn tax_year(&self) -> i32 {
        self.engine.tax_year()
    }

    pub fn set_gross_text(
        &mut self,
        text: &str,
    ) -> &FormStatus {
        self.form.gross_text = text.to_string();
        self.recalculate()
    }

    /// Changes the region, reloads its insurers, then recalculates.
    pub async fn set_region(
        &mut self,
        region: Region,
    ) -> &FormStatus {
        self.form.region = region;
        if self.refresh_insurers().await {
            self.recalculate()
        } else {
            &self.status
        }
    }

    pub fn set_tax_class(
        &mut self,
        tax_class: TaxClass,
    ) -> &FormStatus {
        self.form.tax_class = tax_class;
        self.recalculate()
    }

    pub fn set_church_tax(
        &mut self,
        enabled: bool,
    ) -> &FormStatus {
        self.form.church_tax = enabled;
        self.recalculate()
    }

    /// Selects an insurer by 1-based position.
    pub fn select_insurer_index(
        &mut self,
        position: usize,
    ) -> Result<&FormStatus, SessionError> {
        if self.form.select_insurer_index(position).is_none() {
            return Err(SessionError::UnknownInsurer(format!("#{position}")));
        }
        Ok(self.recalculate())
    }

    /// Selects an insurer by exact name or unique prefix.
    pub fn select_insurer_name(
        &mut self,
        name: &str,
    ) -> Result<&FormStatus, SessionError> {
        if self.form.select_insurer_name(name).is_none() {
            return Err(SessionError::UnknownInsurer(name.trim().to_string()));
        }
        Ok(self.recalculate())
    }

    /// Recomputes from the current form.
    ///
    /// Blank gross pay leaves the form idle. Any failure clears the
    /// previous result and shows the error instead.
    pub fn recalculate(&mut self) -> &FormStatus {
        self.status = if self.form.gross_text.trim().is_empty() {
            FormStatus::Idle
        } else {
            match self.compute() {
                Ok(result) => FormStatus::Computed(result),
                Err(e) => {
                    debug!(error = %e, "calculation failed");
                    FormStatus::Failed(e.to_string())
                }
            }
        };
        &self.status
    }

    /// Computes and, on success, appends the inputs and net pay to the history.
    pub fn save(&mut self) -> Result<&HistoryEntry, SessionError> {
        let result = match self.compute() {
            Ok(result) => result,
            Err(e) => {
                self.status = FormStatus::Failed(e.to_string());
                return Err(e);
            }
        };

        let entry = HistoryEntry {
            gross_text: self.form.gross_text.clone(),
            region: self.form.region,
            tax_class: self.form.tax_class,
            church_tax: self.form.church_tax,
            insurer: self.form.selected_insurer().unwrap_or_default().to_string(),
            net_pay: result.net_pay,
        };
        self.status = FormStatus::Computed(result);
        info!(net = %entry.net_pay, entries = self.history.len() + 1, "saved calculation");
        Ok(self.history.append(entry))
    }

    /// Writes the history to `path`, or to the format's default file.
    /// The form and the history are left untouched.
    pub fn export(
        &self,
        format: ExportFormat,
        path: Option<&Path>,
    ) -> Result<(), SessionError> {
        let path = path.unwrap_or_else(|| Path::new(format.default_path()));
        export::export(&self.history, format, path).map_err(|e| {
            warn!(error = %e, "export failed");
            SessionError::from(e)
        })
    }

    fn compute(&self) -> Result<CalculationResult, SessionError> {
        let text = self.form.gross_text.trim();
        if text.is_empty() {
            return Err(SessionError::MissingGross);
        }
        let gross_pay = parse_decimal(text)?;
        if gross_pay <= Decimal::ZERO {
            return Err(CalculationError::InvalidInput(format!(
                "gross pay must be greater than 0, got {gross_pay}"
            ))
            .into());
        }
        let (_, insurer_rate) = self
            .form
            .selected_rate()
            .ok_or(SessionError::MissingRate(self.form.region))?;

        let input = CalculationInput {
            gross_pay,
            region: self.form.region,
            tax_class: self.form.tax_class,
            church_tax: self.form.church_tax,
            insurer_rate,
        };
        Ok(self.calculator.calculate(self.engine.as_ref(), &input)?)
    }

    /// Reloads the insurer list for the current region. On failure the list
    /// is emptied, the result cleared and `false` returned.
    async fn refresh_insurers(&mut self) -> bool {
        match self.repo.rates_for_region(self.form.region).await {
            Ok(rates) => {
                debug!(
                    region = self.form.region.code(),
                    insurers = rates.len(),
                    "insurers refreshed"
                );
                self.form.set_insurers(rates);
                true
            }
            Err(e) => {
                warn!(region = self.form.region.code(), error = %e, "insurer lookup failed");
                self.form.clear_insurers();
                self.status = FormStatus::Failed(SessionError::Lookup(e).to_string());
                false
            }
        }
    }
}
