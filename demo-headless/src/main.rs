use clap::{Parser, ValueEnum};
use greenhouse_core::constants::STEFAN_BOLTZMANN;
use greenhouse_core::energy::{OUTPUT_ENERGY_RATE, SOLAR_INTENSITY_RANGE};
use greenhouse_core::{
    ConcentrationControlMode, ConcentrationDate, ConcentrationModel, EnergyLayer, LayersModel,
    ModelConfig, TemperatureUnits,
};
use std::process::ExitCode;
use tracing::{error, info};

/// Screen configurations the demo can start from
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Screen {
    /// Three layers, one active, photons and flux meter
    LayerModel,
    /// Twelve layers driven by a greenhouse gas concentration, with a cloud
    Concentration,
    /// Sun, ground and outer space only
    Basic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Date {
    IceAge,
    #[value(name = "1750")]
    SeventeenFifty,
    #[value(name = "1950")]
    NineteenFifty,
    #[value(name = "2020")]
    TwentyTwenty,
}

impl From<Date> for ConcentrationDate {
    fn from(date: Date) -> Self {
        match date {
            Date::IceAge => ConcentrationDate::IceAge,
            Date::SeventeenFifty => ConcentrationDate::SeventeenFifty,
            Date::NineteenFifty => ConcentrationDate::NineteenFifty,
            Date::TwentyTwenty => ConcentrationDate::TwentyTwenty,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Units {
    Kelvin,
    Celsius,
    Fahrenheit,
}

impl From<Units> for TemperatureUnits {
    fn from(units: Units) -> Self {
        match units {
            Units::Kelvin => TemperatureUnits::Kelvin,
            Units::Celsius => TemperatureUnits::Celsius,
            Units::Fahrenheit => TemperatureUnits::Fahrenheit,
        }
    }
}

/// Greenhouse effect model demo with configurable parameters
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "greenhouse-demo")]
#[command(about = "Headless greenhouse effect radiative model", long_about = None)]
struct Args {
    /// Screen preset to start from
    #[arg(short, long, value_enum, default_value_t = Screen::LayerModel)]
    screen: Screen,

    /// JSON model configuration; replaces the screen preset
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Simulated duration in seconds
    #[arg(short, long, default_value_t = 120.0)]
    duration: f64,

    /// Frame duration in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame: f64,

    /// Number of active atmosphere layers
    #[arg(short, long)]
    layers: Option<usize>,

    /// Ground albedo (0-1)
    #[arg(short, long)]
    albedo: Option<f64>,

    /// Solar intensity relative to today's sun (0.5-2)
    #[arg(long)]
    solar_intensity: Option<f64>,

    /// Infrared absorbance of every atmosphere layer (0-1)
    #[arg(long)]
    absorbance: Option<f64>,

    /// Greenhouse gas concentration (0-1), concentration screen only
    #[arg(long)]
    concentration: Option<f64>,

    /// Historical date to take the concentration from, concentration screen only
    #[arg(long, value_enum)]
    date: Option<Date>,

    /// Enable the cloud, if the model has one
    #[arg(long)]
    cloud: bool,

    /// Units for reported temperatures
    #[arg(short, long, value_enum, default_value_t = Units::Kelvin)]
    units: Units,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 5.0)]
    report_interval: f64,

    /// Stop as soon as every active layer reaches equilibrium
    #[arg(long)]
    until_equilibrium: bool,

    /// Print reports as JSON snapshots, one per line
    #[arg(long)]
    json: bool,

    /// Run energy balance validation checks
    #[arg(short, long)]
    validate: bool,
}

/// The model being driven: either a bare layers model or one controlled by concentration
enum Demo {
    Layers(LayersModel),
    Concentration(ConcentrationModel),
}

impl Demo {
    fn layers(&self) -> &LayersModel {
        match self {
            Demo::Layers(model) => model,
            Demo::Concentration(model) => model.layers(),
        }
    }

    fn layers_mut(&mut self) -> &mut LayersModel {
        match self {
            Demo::Layers(model) => model,
            Demo::Concentration(model) => model.layers_mut(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let mut demo = match build_demo(&args) {
        Ok(demo) => demo,
        Err(message) => {
            error!("{}", message);
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    if !args.json {
        println!("=== Greenhouse Effect Model Demo ===\n");
        print_setup(demo.layers());
    }

    run(&mut demo, &args);

    if args.validate && !run_validation_checks() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn build_demo(args: &Args) -> Result<Demo, String> {
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
            ModelConfig::from_json_str(&json).map_err(|err| format!("{}: {err}", path.display()))?
        }
        None => match args.screen {
            Screen::LayerModel => ModelConfig::layer_model(),
            Screen::Concentration => ModelConfig::concentration(),
            Screen::Basic => ModelConfig {
                initially_active_layers: 0,
                ..ModelConfig::default()
            },
        },
    };
    config.validate().map_err(|err| err.to_string())?;
    let capacity = config.atmosphere_layer_capacity;

    let mut demo = if matches!(args.screen, Screen::Concentration) {
        let mut model = ConcentrationModel::with_config(config).map_err(|err| err.to_string())?;
        if let Some(date) = args.date {
            model.set_control_mode(ConcentrationControlMode::ByDate);
            model.set_date(date.into());
        } else if let Some(concentration) = args.concentration {
            check_proportion("concentration", concentration)?;
            model.set_concentration(concentration);
        }
        Demo::Concentration(model)
    } else {
        if args.concentration.is_some() || args.date.is_some() {
            return Err("--concentration and --date need --screen concentration".to_string());
        }
        Demo::Layers(LayersModel::new(config).map_err(|err| err.to_string())?)
    };

    let model = demo.layers_mut();
    if let Some(layers) = args.layers {
        if layers > capacity {
            return Err(format!(
                "{layers} active layers requested but the model has {capacity}"
            ));
        }
        model.set_number_of_active_layers(layers);
    }
    if let Some(albedo) = args.albedo {
        check_proportion("albedo", albedo)?;
        model.set_ground_albedo(albedo);
    }
    if let Some(intensity) = args.solar_intensity {
        if !SOLAR_INTENSITY_RANGE.contains(&intensity) {
            return Err(format!(
                "solar intensity {intensity} outside {:?}",
                SOLAR_INTENSITY_RANGE
            ));
        }
        model.set_solar_intensity(intensity);
    }
    if let Some(absorbance) = args.absorbance {
        check_proportion("absorbance", absorbance)?;
        model.set_infrared_absorbance(absorbance);
    }
    if args.cloud {
        if model.cloud().is_none() {
            return Err("this model has no cloud".to_string());
        }
        model.set_cloud_enabled(true);
    }
    if !(args.frame.is_finite() && args.frame > 0.0) {
        return Err(format!("frame duration {} must be positive", args.frame));
    }
    model.set_temperature_units(args.units.into());

    Ok(demo)
}

fn check_proportion(name: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} {value} outside 0..=1"))
    }
}

fn print_setup(model: &LayersModel) {
    println!(
        "Atmosphere layers: {} allocated, {} active",
        model.atmosphere_layers().len(),
        model.number_of_active_layers()
    );
    println!(
        "Ground albedo: {:.2}, solar intensity: {:.2}",
        model.ground().albedo().value(),
        model.sun().proportion_of_max()
    );
    if let Some(layer) = model.atmosphere_layers().first() {
        println!(
            "Infrared absorbance per layer: {:.3}",
            layer.infrared_absorption().value()
        );
    }
    if let Some(cloud) = model.cloud() {
        println!("Cloud: {}", if cloud.is_enabled() { "on" } else { "off" });
    }
    println!();
}

fn run(demo: &mut Demo, args: &Args) {
    let units: TemperatureUnits = args.units.into();
    let model = demo.layers_mut();
    model.start_sunlight();

    if !args.json {
        println!(
            "Time(s) | Surface ({:>2}) | Net inflow (W/m²) | Outgoing (W/m²) | Balanced",
            units.symbol()
        );
        println!("--------|--------------|-------------------|-----------------|---------");
    }

    let mut next_report = 0.0;
    while model.time() < args.duration {
        model.step(args.frame);

        if model.time() >= next_report {
            report(model, args.json, units);
            next_report += args.report_interval;
        }

        let settled = model.ground().is_at_equilibrium()
            && model.active_layers().all(|layer| layer.is_at_equilibrium());
        if args.until_equilibrium && settled {
            info!("Equilibrium reached at t={:.2}s", model.time());
            report(model, args.json, units);
            break;
        }
    }

    if args.json {
        return;
    }

    println!("\n=== Simulation Complete ===");
    println!("Final time: {:.1}s", model.time());
    println!(
        "Surface temperature: {:.2} {}",
        units.from_kelvin(model.surface_temperature()),
        units.symbol()
    );
    for (index, layer) in model.atmosphere_layers().iter().enumerate() {
        if layer.is_active() {
            println!(
                "Layer {} at {:.0} m: {:.2} {}{}",
                index + 1,
                layer.altitude(),
                units.from_kelvin(layer.temperature()),
                units.symbol(),
                if layer.is_at_equilibrium() {
                    " (equilibrium)"
                } else {
                    ""
                }
            );
        }
    }
    println!(
        "Radiative balance: {}",
        if model.in_radiative_balance() {
            "yes"
        } else {
            "no"
        }
    );
    if let Some(reading) = model.flux_meter().map(|meter| meter.sensor.reading()) {
        println!(
            "Flux at {:.0} m: visible ↓{:.1} ↑{:.1}, infrared ↓{:.1} ↑{:.1} W/m²",
            reading.altitude,
            reading.visible_down,
            reading.visible_up,
            reading.infrared_down,
            reading.infrared_up
        );
    }
    if let Some(photons) = model.photons() {
        println!(
            "Photons: {} live, {} emitted, {} removed",
            photons.len(),
            photons.added_count(),
            photons.removed_count()
        );
    }
}

fn report(model: &LayersModel, json: bool, units: TemperatureUnits) {
    if json {
        match serde_json::to_string(&model.snapshot()) {
            Ok(line) => println!("{line}"),
            Err(err) => error!("Failed to serialize snapshot: {}", err),
        }
        return;
    }
    println!(
        "{:7.1} | {:12.2} | {:17.2} | {:15.2} | {}",
        model.time(),
        units.from_kelvin(model.surface_temperature()),
        model.net_inflow_of_energy(),
        model.outer_space().incoming_energy_rate(),
        if model.in_radiative_balance() { "yes" } else { "no" }
    );
}

/// Run the bare planet and one-layer cases to equilibrium and compare with the analytic
/// surface temperatures
fn run_validation_checks() -> bool {
    println!("\n=== Running Validation Checks ===\n");
    let albedo = 0.3;
    let bare = (OUTPUT_ENERGY_RATE * (1.0 - albedo) / STEFAN_BOLTZMANN).powf(0.25);
    let mut all_passed = true;

    for (layers, expected) in [(0, bare), (1, 2f64.powf(0.25) * bare)] {
        println!("Check: {layers} fully absorbing layer(s)");
        let config = ModelConfig {
            initially_active_layers: layers,
            initial_infrared_absorption: 1.0,
            ground_albedo: albedo,
            ..ModelConfig::default()
        };
        let mut model = match LayersModel::new(config) {
            Ok(model) => model,
            Err(err) => {
                println!("  ✗ FAIL: {err}");
                all_passed = false;
                continue;
            }
        };
        model.start_sunlight();
        while model.time() < 300.0 {
            model.step(1.0 / 30.0);
            if model.ground().is_at_equilibrium()
                && model.active_layers().all(|layer| layer.is_at_equilibrium())
            {
                break;
            }
        }

        let surface = model.surface_temperature().value();
        println!("  Surface temperature: {surface:.2} K after {:.1}s", model.time());
        println!("  Expected: {expected:.2} K");
        if (surface - expected).abs() < 4.0 {
            println!("  ✓ PASS");
        } else {
            println!("  ✗ FAIL: off by {:.2} K", surface - expected);
            all_passed = false;
        }
    }
    all_passed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("demo-headless").chain(extra.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_solar_intensity_follows_core_range() {
        let lowest = SOLAR_INTENSITY_RANGE.start().to_string();
        let highest = SOLAR_INTENSITY_RANGE.end().to_string();
        let above = (SOLAR_INTENSITY_RANGE.end() + 0.5).to_string();

        assert!(build_demo(&args(&["--solar-intensity", &lowest])).is_ok());
        assert!(build_demo(&args(&["--solar-intensity", &highest])).is_ok());
        let err = build_demo(&args(&["--solar-intensity", &above]))
            .err()
            .unwrap();
        assert!(err.contains("solar intensity"), "unexpected error: {err}");
    }

    #[test]
    fn test_concentration_needs_concentration_screen() {
        assert!(build_demo(&args(&["--concentration", "0.5"])).is_err());
        assert!(build_demo(&args(&["--screen", "concentration", "--date", "ice-age"])).is_ok());
    }
}
