use clap::{Parser, Subcommand};
use pds_core::{
    estimate_crcl, resolve_data_dir, CoreConfig, Formulary, InteractionIndex, MockHisClient,
    OrderDraft, PrescriptionService, RenalDosing, Sex,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pds")]
#[command(about = "PDS pharmacy decision support CLI")]
struct Cli {
    /// Reference-data directory (default: auto-detect data/)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a proposed order
    Validate {
        drug_code: String,
        dose: f64,
        dose_unit: String,
        route: String,
        frequency: String,
        /// Patient creatinine clearance (mL/min)
        #[arg(long)]
        crcl: Option<f64>,
    },
    /// Estimate creatinine clearance (Cockcroft-Gault)
    Crcl {
        age_years: u32,
        weight_kg: f64,
        /// Serum creatinine (mg/dL)
        serum_creatinine: f64,
        /// m/male/f/female
        sex: String,
    },
    /// Look up the renal adjustment for a drug at a CrCl
    RenalAdjustment { drug_code: String, crcl: f64 },
    /// Look up a formulary item by drug code
    Formulary { drug_code: String },
    /// Search the formulary by code or name
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List high-alert drugs
    HighAlert,
    /// Check a medication list for pairwise interactions
    Interactions {
        /// Generic drug names
        drugs: Vec<String>,
    },
    /// Validate and submit an order to the (mock) HIS
    Submit {
        patient_id: String,
        drug_code: String,
        dose: f64,
        dose_unit: String,
        route: String,
        frequency: String,
        duration_days: u32,
        physician_id: String,
        #[arg(long)]
        crcl: Option<f64>,
        /// Acknowledge validation warnings and submit anyway
        #[arg(long)]
        override_warnings: bool,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Discontinue an order through the (mock) HIS
    Stop { order_id: String, reason: String },
}

fn load_service(data_dir: Option<PathBuf>) -> anyhow::Result<(PrescriptionService, InteractionIndex)> {
    let cfg = CoreConfig::new(resolve_data_dir(data_dir)?)?;
    let formulary = Arc::new(Formulary::load(&cfg.formulary_path())?);
    let renal_dosing = Arc::new(RenalDosing::load(&cfg.renal_adjustments_path())?);
    let interactions = InteractionIndex::load(&cfg.interactions_path())?;
    let service = PrescriptionService::new(formulary, renal_dosing, Arc::new(MockHisClient::new()));
    Ok((service, interactions))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate {
            drug_code,
            dose,
            dose_unit,
            route,
            frequency,
            crcl,
        }) => {
            let (service, _) = load_service(cli.data_dir)?;
            let result = service.validate_order(&drug_code, dose, &dose_unit, &route, &frequency, crcl);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(Commands::Crcl {
            age_years,
            weight_kg,
            serum_creatinine,
            sex,
        }) => {
            let sex: Sex = sex.parse()?;
            let estimate = estimate_crcl(age_years, weight_kg, serum_creatinine, sex)?;
            println!("CrCl: {} mL/min ({})", estimate.value, estimate.category);
        }
        Some(Commands::RenalAdjustment { drug_code, crcl }) => {
            let (service, _) = load_service(cli.data_dir)?;
            let adjustment = service.renal_adjustment(&drug_code, crcl);
            println!("{}", serde_json::to_string_pretty(&adjustment)?);
        }
        Some(Commands::Formulary { drug_code }) => {
            let (service, _) = load_service(cli.data_dir)?;
            match service.formulary_item(&drug_code) {
                Some(item) => println!("{}", serde_json::to_string_pretty(&item)?),
                None => eprintln!("Drug code {drug_code} is not in the formulary"),
            }
        }
        Some(Commands::Search { query, limit }) => {
            let (service, _) = load_service(cli.data_dir)?;
            let items = service.search_formulary(&query, limit);
            if items.is_empty() {
                println!("No matching drugs found.");
            } else {
                for item in items {
                    println!(
                        "{}: {} ({}) {}",
                        item.drug_code, item.drug_name, item.generic_name, item.default_frequency
                    );
                }
            }
        }
        Some(Commands::HighAlert) => {
            let (service, _) = load_service(cli.data_dir)?;
            for item in service.high_alert_drugs() {
                println!("{}: {}", item.drug_code, item.drug_name);
            }
        }
        Some(Commands::Interactions { drugs }) => {
            let (_, interactions) = load_service(cli.data_dir)?;
            let found = interactions.check_list(&drugs);
            if found.is_empty() {
                println!("No known interactions.");
            } else {
                for record in found {
                    println!(
                        "{} + {} [{:?}]: {}",
                        record.drug_a, record.drug_b, record.severity, record.recommendation
                    );
                }
            }
        }
        Some(Commands::Submit {
            patient_id,
            drug_code,
            dose,
            dose_unit,
            route,
            frequency,
            duration_days,
            physician_id,
            crcl,
            override_warnings,
            notes,
        }) => {
            let (service, _) = load_service(cli.data_dir)?;
            let draft = OrderDraft {
                patient_id,
                drug_code,
                dose,
                dose_unit,
                route,
                frequency,
                duration_days,
                physician_id,
                notes,
            };
            let result = service.submit_order(&draft, crcl, override_warnings).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(Commands::Stop { order_id, reason }) => {
            let (service, _) = load_service(cli.data_dir)?;
            let result = service.stop_order(&order_id, &reason).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        None => {
            println!("Use 'pds --help' for commands");
        }
    }

    Ok(())
}
