use crate::infra::{parse_vehicles, read_input, InMemoryVehicleRepository};
use bid_desk::config::{AppConfig, ValuationConfig};
use bid_desk::damage::{analyze_response, normalize_response, SeverityReconciler};
use bid_desk::desk::VehicleDeskService;
use bid_desk::error::AppError;
use bid_desk::valuation::{evaluate_vehicle, ExchangeRate, VehicleEvaluation};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ValuationOverrides {
    /// Override the AED per EUR exchange rate
    #[arg(long)]
    pub(crate) rate: Option<f64>,
    /// Override the target profit percentage
    #[arg(long)]
    pub(crate) target_profit_pct: Option<f64>,
}

impl ValuationOverrides {
    fn apply(&self, mut valuation: ValuationConfig) -> ValuationConfig {
        if let Some(rate) = self.rate {
            valuation.exchange_rate = ExchangeRate::new(rate);
        }
        if let Some(pct) = self.target_profit_pct {
            valuation.settings.target_profit_pct = pct;
        }
        valuation
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct EvaluateArgs {
    /// JSON file with one vehicle or an array of vehicles (stdin when omitted)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) overrides: ValuationOverrides,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct NormalizeArgs {
    /// Raw describer response (stdin when omitted)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Override the AED per EUR exchange rate used for EUR figures
    #[arg(long)]
    pub(crate) rate: Option<f64>,
    /// Skip the severity cross-check
    #[arg(long)]
    pub(crate) no_reconcile: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// JSON file with one vehicle or an array of vehicles (stdin when omitted)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// CSV destination (stdout when omitted)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) overrides: ValuationOverrides,
}

fn load_valuation(overrides: &ValuationOverrides) -> Result<ValuationConfig, AppError> {
    Ok(overrides.apply(AppConfig::load()?.valuation))
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let valuation = load_valuation(&args.overrides)?;
    let vehicles = parse_vehicles(&read_input(args.input.as_deref())?)?;

    let evaluations: Vec<VehicleEvaluation> = vehicles
        .iter()
        .map(|vehicle| evaluate_vehicle(vehicle, &valuation.settings, valuation.exchange_rate))
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&evaluations)?),
        OutputFormat::Table => {
            for evaluation in &evaluations {
                println!("{}", render_evaluation(evaluation));
            }
        }
    }
    Ok(())
}

pub(crate) fn render_evaluation(evaluation: &VehicleEvaluation) -> String {
    let costs = &evaluation.costs;
    format!(
        "{} {} | bid {:.0} AED ({:.2} EUR) | total {:.2} EUR | profit {:.2} EUR ({:.1}%) | max bid {:.0} EUR / {:.0} AED | {} {}: {}",
        evaluation.vehicle_id,
        evaluation.title,
        costs.bid_price_aed,
        costs.bid_price,
        costs.total_cost,
        costs.profit,
        costs.profit_pct,
        costs.max_bid,
        costs.max_bid_aed,
        evaluation.ampel.color.label().to_uppercase(),
        evaluation.ampel.label,
        evaluation.ampel.reason,
    )
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let valuation = AppConfig::load()?.valuation;
    let rate = args
        .rate
        .map(ExchangeRate::new)
        .unwrap_or(valuation.exchange_rate);
    let raw = read_input(args.input.as_deref())?;

    let report = if args.no_reconcile {
        normalize_response(&raw, rate)?
    } else {
        analyze_response(&raw, rate, &SeverityReconciler::new(valuation.severity_bands))?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let valuation = load_valuation(&args.overrides)?;
    let vehicles = parse_vehicles(&read_input(args.input.as_deref())?)?;
    let repository = Arc::new(InMemoryVehicleRepository::with_vehicles(vehicles));
    let service = VehicleDeskService::new(repository, valuation);

    match args.output {
        Some(path) => {
            let rows = service.export_csv(BufWriter::new(File::create(&path)?))?;
            println!("Exported {rows} evaluations to {}", path.display());
        }
        None => {
            service.export_csv(std::io::stdout().lock())?;
        }
    }
    Ok(())
}
