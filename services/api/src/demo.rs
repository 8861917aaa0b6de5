use crate::commands::render_evaluation;
use crate::infra::InMemoryVehicleRepository;
use bid_desk::config::ValuationConfig;
use bid_desk::damage::{
    DamageDescriber, DamageReport, DescriberError, DescriberImage, DescriberRequest,
};
use bid_desk::desk::{ReviewSubmission, VehicleDeskService, VehicleSubmission};
use bid_desk::error::AppError;
use bid_desk::valuation::{CostInputs, ExchangeRate};
use chrono::Local;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// AED per EUR rate for the demo (defaults to 4.0)
    #[arg(long)]
    pub(crate) rate: Option<f64>,
    /// Skip the damage-report portion of the demo.
    #[arg(long)]
    pub(crate) skip_damage: bool,
}

/// Stands in for the vision service with a typical, slightly malformed answer.
struct CannedDescriber;

const CANNED_RESPONSE: &str = r#"```json
{
  "bauteil": "Heck",
  "schadensanalyse": "Heckaufprall, Heckklappe verzogen, Rücklicht rechts gebrochen.",
  "schweregrad": "6",
  "reparaturweg": "Heckklappe richten und lackieren, Rücklicht ersetzen",
  "teile_zu_ersetzen": [
    { "teil": "Rücklicht rechts", "grund": "gebrochen", "beleg": "Bild 3", "konfidenz": 95 },
  ],
  "teile_zu_pruefen": [
    { "teil": "Längsträger hinten", "verdacht": "Stauchung", "pruefmethode": "Rahmenvermessung" }
  ],
  "kosten_schaetzung_aed": {
    "teile": "1,800 AED",
    "arbeit": { "min": 1500, "max": 2500 },
  },
  "fahrbereit": true,
  "risiko_flags": "Rahmenschaden möglich",
}
```"#;

impl DamageDescriber for CannedDescriber {
    fn describe(&self, request: &DescriberRequest) -> Result<String, DescriberError> {
        if request.images.is_empty() {
            return Err(DescriberError::NoImages);
        }
        Ok(CANNED_RESPONSE.to_string())
    }
}

fn demo_lots() -> Vec<VehicleSubmission> {
    vec![
        VehicleSubmission {
            title: "Nissan Patrol 2019".to_string(),
            start_bid: Some(50_000.0),
            market_price_de: Some(15_000.0),
            created_by: Some("demo".to_string()),
            ..VehicleSubmission::default()
        },
        VehicleSubmission {
            title: "Toyota Hilux 2018".to_string(),
            start_bid: Some(16_000.0),
            market_price_de: Some(15_000.0),
            created_by: Some("demo".to_string()),
            ..VehicleSubmission::default()
        },
        VehicleSubmission {
            title: "Lexus LX 570 2017".to_string(),
            start_bid: Some(90_000.0),
            final_bid: Some(96_500.0),
            market_price_de: Some(48_000.0),
            cost_inputs: CostInputs {
                transport_cost: Some(3_200.0),
                ..CostInputs::default()
            },
            created_by: Some("demo".to_string()),
        },
    ]
}

fn demo_review(mechanic_id: &str, recommendation: &str, estimate: f64, comment: &str) -> ReviewSubmission {
    ReviewSubmission {
        mechanic_id: mechanic_id.to_string(),
        recommendation: Some(recommendation.to_string()),
        repair_estimate: estimate,
        risk: None,
        comment: comment.to_string(),
    }
}

fn print_damage(report: &DamageReport) {
    println!(
        "  {}: severity {}/10 ({}) | roadworthy {:?} | est. repair {:.2} EUR",
        report.component,
        report.severity_score,
        report.severity.label(),
        report.roadworthy,
        report.estimated_repair_cost
    );
    for part in &report.parts_to_replace {
        println!("    replace {} ({:.0}% sure)", part.part_name, part.confidence * 100.0);
    }
    for part in &report.parts_to_inspect {
        println!("    inspect {} via {}", part.part_name, part.inspection_method);
    }
    if let Some(breakdown) = &report.severity_breakdown {
        println!(
            "    cross-check: technical {:.1} | economic {:.1} | combined {:.1} (deviation {:+.1})",
            breakdown.technical_severity,
            breakdown.economic_severity,
            breakdown.combined_severity,
            breakdown.deviation
        );
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { rate, skip_damage } = args;

    let mut valuation = ValuationConfig::default();
    if let Some(rate) = rate {
        valuation.exchange_rate = ExchangeRate::new(rate);
    }

    println!("Bid desk demo ({})", Local::now().format("%Y-%m-%d"));
    println!(
        "- rate 1 EUR = {} AED | target profit {}%",
        valuation.exchange_rate.aed_per_eur(),
        valuation.settings.target_profit_pct
    );

    let repository = Arc::new(InMemoryVehicleRepository::default());
    let service = VehicleDeskService::new(repository, valuation);

    let mut vehicles = Vec::new();
    for lot in demo_lots() {
        vehicles.push(service.register(lot)?);
    }

    service.add_review(
        &vehicles[1].id,
        demo_review("mech-ali", "green", 400.0, "Kleine Delle, sonst gut"),
    )?;
    service.add_review(
        &vehicles[2].id,
        demo_review("mech-ali", "orange", 2_800.0, "Getriebe ruckelt"),
    )?;
    service.add_review(
        &vehicles[2].id,
        demo_review("mech-omar", "orange", 3_400.0, "Probefahrt nötig"),
    )?;

    if !skip_damage {
        println!("\nDamage analysis for {}", vehicles[1].title);
        let images = vec![DescriberImage {
            media_type: "image/jpeg".to_string(),
            data: "https://example.invalid/lots/hilux/rear.jpg".to_string(),
        }];
        match service.request_damage_analysis(&vehicles[1].id, &CannedDescriber, images) {
            Ok(report) => print_damage(&report),
            Err(err) => println!("  Damage analysis rejected: {}", err),
        }
    }

    println!("\nEvaluations");
    for evaluation in service.evaluate_all()? {
        println!("- {}", render_evaluation(&evaluation));
        println!(
            "  repair estimate {:.2} EUR from {:?} | reviews {} (green {}, orange {}, red {})",
            evaluation.costs.repair_estimate_avg,
            evaluation.costs.repair_estimate_source,
            evaluation.consensus.total,
            evaluation.consensus.green,
            evaluation.consensus.orange,
            evaluation.consensus.red
        );
    }

    Ok(())
}
