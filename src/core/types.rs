use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DeductionPolicy {
    None,
    FlatPercent { rate: f64 },
    ReversePf,
}

#[derive(Debug, Clone)]
pub struct Inputs {
    pub annual_package_lakhs: f64,
    pub monthly_saving: f64,
    pub horizon_years: f64,
    pub policy: DeductionPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationBreakdown {
    pub annual_ctc: f64,
    pub monthly_ctc: f64,
    pub gross_monthly: f64,
    pub basic_monthly: f64,
    pub monthly_employee_pf: f64,
    pub yearly_employee_pf: f64,
    pub monthly_employer_pf: f64,
    pub yearly_employer_pf: f64,
    pub net_monthly: f64,
    pub monthly_saving: f64,
    pub yearly_saving: f64,
    pub total_saving: f64,
}
