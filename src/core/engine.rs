use thiserror::Error;

use super::types::{CompensationBreakdown, DeductionPolicy, Inputs};

const LAKH: f64 = 100_000.0;
const BASIC_SHARE_OF_GROSS: f64 = 0.40;
const PF_RATE_OF_BASIC: f64 = 0.12;
// CTC = Gross + EmployerPF, EmployerPF = 0.12 * Basic, Basic = 0.40 * Gross,
// so CTC = 1.048 * Gross.
const CTC_PER_GROSS: f64 = 1.0 + PF_RATE_OF_BASIC * BASIC_SHARE_OF_GROSS;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn compute(inputs: &Inputs) -> Result<CompensationBreakdown, EngineError> {
    validate(inputs)?;

    let annual_ctc = inputs.annual_package_lakhs * LAKH;
    let monthly_ctc = annual_ctc / 12.0;

    let (gross_monthly, monthly_employee_pf, monthly_employer_pf) = match inputs.policy {
        DeductionPolicy::ReversePf => {
            let gross = monthly_ctc / CTC_PER_GROSS;
            let employee_pf = PF_RATE_OF_BASIC * BASIC_SHARE_OF_GROSS * gross;
            (gross, employee_pf, employee_pf)
        }
        // The flat and no-deduction models treat the whole CTC as gross; no
        // employer share is embedded in the package figure.
        DeductionPolicy::FlatPercent { rate } => (monthly_ctc, rate * monthly_ctc, 0.0),
        DeductionPolicy::None => (monthly_ctc, 0.0, 0.0),
    };

    let basic_monthly = BASIC_SHARE_OF_GROSS * gross_monthly;
    let net_monthly = gross_monthly - monthly_employee_pf;
    let yearly_saving = 12.0 * inputs.monthly_saving;
    let total_saving = yearly_saving * inputs.horizon_years;

    Ok(CompensationBreakdown {
        annual_ctc,
        monthly_ctc,
        gross_monthly,
        basic_monthly,
        monthly_employee_pf,
        yearly_employee_pf: 12.0 * monthly_employee_pf,
        monthly_employer_pf,
        yearly_employer_pf: 12.0 * monthly_employer_pf,
        net_monthly,
        monthly_saving: inputs.monthly_saving,
        yearly_saving,
        total_saving,
    })
}

fn validate(inputs: &Inputs) -> Result<(), EngineError> {
    for (name, value) in [
        ("annual package", inputs.annual_package_lakhs),
        ("monthly saving", inputs.monthly_saving),
        ("horizon years", inputs.horizon_years),
    ] {
        if !value.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "{name} must be a finite number"
            )));
        }
        if value < 0.0 {
            return Err(EngineError::InvalidInput(format!("{name} must be >= 0")));
        }
    }

    if inputs.horizon_years.fract() != 0.0 {
        return Err(EngineError::InvalidInput(
            "horizon years must be a whole number".to_string(),
        ));
    }

    if let DeductionPolicy::FlatPercent { rate } = inputs.policy {
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(EngineError::InvalidInput(
                "flat deduction rate must be between 0 and 1".to_string(),
            ));
        }
    }

    Ok(())
}
