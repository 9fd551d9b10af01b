use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use farm_grants::{
    config::AppConfig,
    grant::{parse_area, GrantBreakdown, GrantRequest},
    model::{CropType, ProgramType, WaterEfficiencyClass, WateringMethod},
    plan::{FarmProfile, PlanLoader, Quote},
    rates::RateCardLoader,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Farm transition grant calculator")]
struct Cli {
    /// Path to the application config YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rate card YAML overriding the configured schedule
    #[arg(long, global = true)]
    rate_card: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Per-hectare base rate for one crop type
    Rate {
        #[arg(long)]
        crop: CropType,
        /// Area in hectares; unparsable input counts as zero
        #[arg(long, allow_hyphen_values = true)]
        area: String,
        #[arg(long)]
        program: ProgramType,
        #[arg(long, default_value = "rain-fed")]
        watering: WateringMethod,
    },
    /// Grant breakdown for one crop type
    Grant {
        #[arg(long)]
        crop: CropType,
        #[arg(long, allow_hyphen_values = true)]
        area: String,
        #[arg(long)]
        program: ProgramType,
        #[arg(long, default_value = "rain-fed")]
        watering: WateringMethod,
        #[arg(long)]
        ground_cover: bool,
        #[arg(long, default_value = "None")]
        water_efficiency: WaterEfficiencyClass,
    },
    /// Quote a farm plan file
    Quote {
        #[arg(long)]
        plan: PathBuf,
        /// Override the program named in the plan
        #[arg(long)]
        program: Option<ProgramType>,
        /// Quote the plan under every program
        #[arg(long)]
        compare: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the active rate card as YAML
    Rates,
    /// Serve the JSON API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_yaml(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config.logging.level);

    let rate_card = match &cli.rate_card {
        Some(path) => RateCardLoader::new(".").load(path)?,
        None => {
            let base_dir = cli
                .config
                .as_deref()
                .and_then(Path::parent)
                .unwrap_or_else(|| Path::new("."));
            config.load_rate_card(base_dir)?
        }
    };

    match cli.command {
        Command::Rate {
            crop,
            area,
            program,
            watering,
        } => {
            let area = parse_area(&area);
            let rate = rate_card.rate(crop, area, program, watering);
            println!(
                "{} {} ({}) at {area} ha: {rate:.2} €/ha, base {:.2} €",
                crop.label(),
                program,
                watering,
                rate * area
            );
        }
        Command::Grant {
            crop,
            area,
            program,
            watering,
            ground_cover,
            water_efficiency,
        } => {
            let breakdown = rate_card.grant(&GrantRequest {
                crop,
                area: parse_area(&area),
                program,
                watering_method: watering,
                ground_cover,
                water_efficiency,
            });
            print_breakdown(&breakdown);
            println!("Total: {:.2} €", breakdown.total);
        }
        Command::Quote {
            plan,
            program,
            compare,
            json,
        } => {
            let mut plan = PlanLoader::new(".").load(&plan)?;
            if let Some(program) = program {
                plan.set_program(program);
            }
            let quotes = if compare {
                plan.compare(&rate_card)
            } else {
                vec![plan.quote(&rate_card)]
            };
            let profile = plan.profile();
            if json {
                let body = serde_json::json!({ "quotes": quotes, "profile": profile });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                for quote in &quotes {
                    print_quote(quote);
                }
                print_profile(&profile);
            }
        }
        Command::Rates => {
            print!("{}", serde_yaml::to_string(&rate_card)?);
        }
        Command::Serve { host, port } => {
            web::run(WebServerConfig {
                rate_card,
                host: host.unwrap_or(config.server.host),
                port: port.unwrap_or(config.server.port),
            })
            .await?;
        }
    }
    Ok(())
}

fn init_logging(default_level: &str) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(default_level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn print_breakdown(line: &GrantBreakdown) {
    println!(
        "{:<13} {:>8.2} ha  {:>7.2} €/ha  base {:>10.2}  cover {:>9.2}  water {:>9.2}  = {:>10.2} €",
        line.crop.label(),
        line.area,
        line.rate_per_ha,
        line.base_amount,
        line.ground_cover_amount,
        line.water_efficiency_amount,
        line.total
    );
}

fn print_quote(quote: &Quote) {
    println!("Program: {}", quote.program);
    for line in quote.lines.iter().filter(|line| !line.is_empty()) {
        print_breakdown(line);
    }
    println!("Total: {:.2} €", quote.total);
    println!();
}

fn print_profile(profile: &FarmProfile) {
    println!("Total farm size: {} ha", profile.total_area);
    println!("Transition period: {} years", profile.transition_period_years);
    for active in &profile.active_crops {
        println!("  {:<13} {} ha", active.crop.label(), active.area);
    }
}
