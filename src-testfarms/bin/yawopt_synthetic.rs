//! Yaw optimization of a farm description against a synthetic flow-field model.
//!
//! Prints the optimal yaw angles and the power gain, then the full report.
//! Optionally writes the outcome JSON, the report text and a per-generation
//! CSV record under `$YAWOPT_DIR/data_generated/records`.

use clap::Parser;
use std::error::Error;

use yawopt::cli::Args;
use yawopt::de::OptimizationRecorder;
use yawopt::{FarmDescription, OutcomeReport, StrategyKind, YawOptimizer};
use yawopt_testfarms::{SyntheticFarm, alpha_ventus_description, get_farm_metadata};

#[derive(Parser, Debug)]
#[command(author, version, about = "Wake-steering yaw optimization on synthetic farms", long_about = None)]
struct SyntheticArgs {
    #[command(flatten)]
    common: Args,

    /// Synthetic flow-field model standing in for the wake simulator.
    #[arg(long, value_enum, default_value_t = SyntheticFarm::GaussianWake)]
    model: SyntheticFarm,

    /// Display the available synthetic models and exit.
    #[arg(long, default_value_t = false)]
    model_list: bool,
}

fn print_model_list() {
    let metadata = get_farm_metadata();
    let mut names: Vec<&String> = metadata.keys().collect();
    names.sort();
    println!("Available synthetic models");
    println!("==========================\n");
    for name in names {
        let m = &metadata[name];
        println!("   - {:<18} | {}", m.name, m.description);
        if let Some(optimum) = &m.known_optimum {
            println!("     {:<18} | optimum: {}", "", optimum);
        }
    }
}

/// Record file name: farm name without spaces, plus the wind direction
fn record_name(farm: &FarmDescription) -> String {
    let name: String = farm
        .name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}deg", name, farm.farm.properties.wind_direction)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = SyntheticArgs::parse();
    if args.model_list {
        print_model_list();
        return Ok(());
    }

    let config = args.common.to_config()?;
    if args.common.record {
        // records go under $YAWOPT_DIR/data_generated
        yawopt_env::check_yawopt_env()?;
    }
    let farm = match &args.common.farm {
        Some(path) => FarmDescription::from_json_file(path)?,
        None => alpha_ventus_description(),
    };
    let layout = farm.layout()?;
    let wind = farm.wind()?;
    let model = args.model.build(layout.len());

    let mut optimizer = YawOptimizer::new(config.clone())?;
    let recorder = args.common.record.then(|| OptimizationRecorder::new(record_name(&farm)));
    if let Some(recorder) = &recorder {
        if config.strategy == StrategyKind::DifferentialEvolution {
            optimizer =
                optimizer.with_strategy(config.differential_evolution()?.with_recorder(recorder.clone()));
        } else {
            log::warn!("--record only applies to the differential-evolution strategy");
        }
    }

    println!(
        "Finding optimal yaw angles for '{}' ({} turbines, {} model, {})...",
        farm.name(),
        layout.len(),
        model.name(),
        optimizer.strategy_name()
    );
    let outcome = optimizer.optimize_with_config_bounds(model.as_ref(), &layout, &wind)?;

    println!("yaw angles = ");
    for (i, yaw) in outcome.yaw.as_slice().iter().enumerate() {
        println!("Turbine {} = {:.4} deg", i, yaw);
    }
    println!("==========================================");
    match outcome.gain_percent {
        Some(gain) => println!("Total Power Gain = {:.1}%", gain),
        None => println!("Total Power Gain = undefined (baseline power is not positive)"),
    }
    println!("==========================================");

    let report = OutcomeReport::new(&farm, &outcome);
    println!("\n{}\n", report);

    if let Some(path) = &args.common.output {
        outcome.save_json(path)?;
        println!("Outcome written to {}", path.display());
    }
    if let Some(path) = &args.common.report {
        report.save(path)?;
        println!("Report written to {}", path.display());
    }
    if let Some(recorder) = recorder {
        let records_dir = yawopt_env::get_records_dir()?;
        let path = recorder.save_to_csv(&records_dir)?;
        println!("{} generations recorded in {}", recorder.num_iterations(), path.display());
    }

    Ok(())
}
