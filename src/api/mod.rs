use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{CompensationBreakdown, DeductionPolicy, Inputs, compute};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDeductionPolicy {
    None,
    Flat,
    ReversePf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDeductionPolicy {
    None,
    #[serde(alias = "flatPercent", alias = "flat_percent")]
    Flat,
    #[serde(alias = "reversePf", alias = "reverse_pf")]
    ReversePf,
}

impl From<ApiDeductionPolicy> for CliDeductionPolicy {
    fn from(value: ApiDeductionPolicy) -> Self {
        match value {
            ApiDeductionPolicy::None => CliDeductionPolicy::None,
            ApiDeductionPolicy::Flat => CliDeductionPolicy::Flat,
            ApiDeductionPolicy::ReversePf => CliDeductionPolicy::ReversePf,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "takehome", about = "Salary breakdown and savings projection")]
pub struct Cli {
    #[arg(long, help = "Display name used in the greeting")]
    name: Option<String>,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Annual package in lakhs (multiples of 100,000)"
    )]
    package_lpa: f64,
    #[arg(long, default_value_t = 5000.0, help = "Amount saved per month")]
    monthly_saving: f64,
    #[arg(long, default_value_t = 5.0, help = "Projection horizon in whole years")]
    years: f64,
    #[arg(
        long,
        value_enum,
        default_value_t = CliDeductionPolicy::ReversePf,
        help = "Deduction model: none, flat, or reverse-pf"
    )]
    deduction_policy: CliDeductionPolicy,
    #[arg(
        long,
        default_value_t = 10.0,
        help = "Flat deduction as percent of gross; used with --deduction-policy flat"
    )]
    flat_deduction_rate: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BreakdownPayload {
    name: Option<String>,
    package_lpa: Option<f64>,
    monthly_saving: Option<f64>,
    years: Option<f64>,
    deduction_policy: Option<ApiDeductionPolicy>,
    flat_deduction_rate: Option<f64>,
}

#[derive(Debug)]
struct ApiRequest {
    inputs: Inputs,
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartSegment {
    label: &'static str,
    value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyDisplay {
    gross_monthly: String,
    monthly_employee_pf: String,
    net_monthly: String,
    monthly_saving: String,
    remaining_balance: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearlyDisplay {
    annual_ctc: String,
    yearly_saving: String,
    total_saving: String,
    years: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DisplayBlock {
    monthly: MonthlyDisplay,
    yearly: YearlyDisplay,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BreakdownResponse {
    greeting: String,
    breakdown: CompensationBreakdown,
    remaining_balance: f64,
    chart_segments: Vec<ChartSegment>,
    display: DisplayBlock,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: Cli) -> Result<Inputs, String> {
    if !cli.package_lpa.is_finite() || cli.package_lpa < 0.0 {
        return Err("--package-lpa must be >= 0".to_string());
    }

    if !cli.monthly_saving.is_finite() || cli.monthly_saving < 0.0 {
        return Err("--monthly-saving must be >= 0".to_string());
    }

    if !cli.years.is_finite() || cli.years < 0.0 {
        return Err("--years must be >= 0".to_string());
    }

    if cli.years.fract() != 0.0 {
        return Err("--years must be a whole number of years".to_string());
    }

    if !(0.0..=100.0).contains(&cli.flat_deduction_rate) {
        return Err("--flat-deduction-rate must be between 0 and 100".to_string());
    }

    let policy = match cli.deduction_policy {
        CliDeductionPolicy::None => DeductionPolicy::None,
        CliDeductionPolicy::Flat => DeductionPolicy::FlatPercent {
            rate: cli.flat_deduction_rate / 100.0,
        },
        CliDeductionPolicy::ReversePf => DeductionPolicy::ReversePf,
    };

    Ok(Inputs {
        annual_package_lakhs: cli.package_lpa,
        monthly_saving: cli.monthly_saving,
        horizon_years: cli.years,
        policy,
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/breakdown",
            get(breakdown_get_handler).post(breakdown_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "breakdown API listening");
    println!("takehome HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

pub fn run_compute(args: &[String]) -> Result<String, String> {
    let cli = Cli::try_parse_from(
        std::iter::once("takehome".to_string()).chain(args.iter().cloned()),
    )
    .map_err(|e| e.to_string())?;

    let name = normalize_name(cli.name.clone());
    let inputs = build_inputs(cli)?;
    let request = ApiRequest { inputs, name };
    let breakdown = compute(&request.inputs).map_err(|e| e.to_string())?;
    let response = build_breakdown_response(&request, &breakdown);
    serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn breakdown_get_handler(Query(payload): Query<BreakdownPayload>) -> Response {
    breakdown_handler_impl(payload).await
}

async fn breakdown_post_handler(Json(payload): Json<BreakdownPayload>) -> Response {
    breakdown_handler_impl(payload).await
}

async fn breakdown_handler_impl(payload: BreakdownPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            tracing::warn!(error = %msg, "rejected breakdown request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let breakdown = match compute(&request.inputs) {
        Ok(breakdown) => breakdown,
        Err(e) => {
            tracing::warn!(error = %e, "engine rejected inputs");
            return error_response(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    json_response(StatusCode::OK, build_breakdown_response(&request, &breakdown))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<BreakdownPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: BreakdownPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.package_lpa {
        cli.package_lpa = v;
    }
    if let Some(v) = payload.monthly_saving {
        cli.monthly_saving = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.deduction_policy {
        cli.deduction_policy = v.into();
    }
    if let Some(v) = payload.flat_deduction_rate {
        cli.flat_deduction_rate = v;
    }

    let name = normalize_name(payload.name);
    let inputs = build_inputs(cli)?;
    Ok(ApiRequest { inputs, name })
}

fn default_cli_for_api() -> Cli {
    Cli {
        name: None,
        package_lpa: 12.0,
        monthly_saving: 5_000.0,
        years: 5.0,
        deduction_policy: CliDeductionPolicy::ReversePf,
        flat_deduction_rate: 10.0,
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

fn greeting_for(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("Hello, {name} \u{1F44B}"),
        None => "Hello \u{1F44B}".to_string(),
    }
}

fn build_breakdown_response(
    request: &ApiRequest,
    breakdown: &CompensationBreakdown,
) -> BreakdownResponse {
    let remaining_balance = breakdown.net_monthly - breakdown.monthly_saving;

    BreakdownResponse {
        greeting: greeting_for(request.name.as_deref()),
        breakdown: breakdown.clone(),
        remaining_balance,
        chart_segments: vec![
            ChartSegment {
                label: "Monthly Saving",
                value: breakdown.monthly_saving,
            },
            ChartSegment {
                label: "Monthly Deduction",
                value: breakdown.monthly_employee_pf,
            },
            ChartSegment {
                label: "Remaining Balance",
                value: remaining_balance,
            },
        ],
        display: DisplayBlock {
            monthly: MonthlyDisplay {
                gross_monthly: format_inr(breakdown.gross_monthly),
                monthly_employee_pf: format_inr(breakdown.monthly_employee_pf),
                net_monthly: format_inr(breakdown.net_monthly),
                monthly_saving: format_inr(breakdown.monthly_saving),
                remaining_balance: format_inr(remaining_balance),
            },
            yearly: YearlyDisplay {
                annual_ctc: format_inr(breakdown.annual_ctc),
                yearly_saving: format_inr(breakdown.yearly_saving),
                total_saving: format_inr(breakdown.total_saving),
                years: format!("{}", request.inputs.horizon_years as i64),
            },
        },
    }
}

// Indian digit grouping: last three digits, then pairs (12,34,567).
// Values are rounded to the nearest whole unit before grouping; full
// precision lives in the breakdown fields.
fn format_inr(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let count = digits.len();

    let mut grouped = String::with_capacity(count + count / 2 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 {
            let remaining = count - i;
            if remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0) {
                grouped.push(',');
            }
        }
        grouped.push(c);
    }
    grouped
}
