//! BB84 QKD CLI
//!
//! Command-line interface for running simulations and device analyses.
//! Every command prints its record as JSON and exits non-zero when the
//! run fails.

use bb84_qkd::{
    backend::{MockQuantumDevice, QuantumService, UnavailableService},
    channel::AttackKind,
    config::FileConfig,
    device::{DetectionBatch, MobileMeasurementBatch},
    metrics::{MetricsRegistry, MetricsSnapshot, RunKind},
    orchestration::{BackendType, GenerationMethod, RunFailure, Scenario},
    protocol::{ErrorCorrection, PrivacyAmplification},
    randomness::{ClassicalRng, RngMode},
};
use clap::{Args, Parser, Subcommand};
use rand_core::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bb84-qkd", version, about = "BB84 QKD simulator and device testbed")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for reproducible runs.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Use the in-process mock device as the quantum hardware service.
    #[arg(long, global = true)]
    mock_device: bool,

    /// Serve Prometheus metrics on this port after the run (0 = off).
    #[arg(long, global = true, default_value_t = 0)]
    metrics_port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a BB84 simulation.
    Simulate(SimulateArgs),
    /// Analyze the quantum hardware service with the lab profile.
    Testbed {
        /// Photon rate in MHz.
        #[arg(long)]
        photon_rate: Option<f64>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Analyze a mobile measurement batch (JSON file).
    Mobile {
        batch: PathBuf,
        #[arg(long, default_value = "mobile_device")]
        device_id: String,
    },
    /// Summarize a photon-detection list (JSON file).
    Detections {
        file: Option<PathBuf>,
        /// Use a synthetic batch instead of a file.
        #[arg(long)]
        simulate: bool,
    },
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long, value_parser = wire::<Scenario>)]
    scenario: Option<Scenario>,
    #[arg(long)]
    bits: Option<String>,
    #[arg(long)]
    bases: Option<String>,
    #[arg(long)]
    num_qubits: Option<usize>,
    #[arg(long, value_parser = wire::<RngMode>)]
    rng_type: Option<RngMode>,
    #[arg(long)]
    photon_rate: Option<f64>,
    #[arg(long)]
    photon_count: Option<u64>,
    #[arg(long, value_parser = wire::<GenerationMethod>)]
    generation_method: Option<GenerationMethod>,
    #[arg(long)]
    distance: Option<f64>,
    #[arg(long)]
    noise: Option<f64>,
    #[arg(long, value_parser = wire::<AttackKind>)]
    eve_attack: Option<AttackKind>,
    #[arg(long, value_parser = wire::<ErrorCorrection>)]
    error_correction: Option<ErrorCorrection>,
    #[arg(long, value_parser = wire::<PrivacyAmplification>)]
    privacy_amplification: Option<PrivacyAmplification>,
    #[arg(long, value_parser = wire::<BackendType>)]
    backend_type: Option<BackendType>,
    #[arg(long)]
    api_key: Option<String>,
}

/// Parses a CLI value by its serialized name (`intercept_resend`, ...).
fn wire<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|e| e.to_string())
}

enum Outcome {
    Success { json: String, snapshot: MetricsSnapshot },
    Failure { json: String, failure: RunFailure, kind: RunKind },
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"status":"error","error":"{}"}}"#, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("BB84 QKD v{}", bb84_qkd::VERSION);

    let config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let mut rng = match cli.seed {
        Some(seed) => ClassicalRng::seed_from_u64(seed),
        None => ClassicalRng::from_os_entropy(),
    };
    let hardware: Arc<dyn QuantumService> = if cli.mock_device {
        Arc::new(MockQuantumDevice::new())
    } else {
        Arc::new(UnavailableService)
    };

    let outcome = match execute(&cli.command, &config, &mut rng, hardware) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let registry = match MetricsRegistry::new() {
        Ok(registry) => Some(registry),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    let exit_code = match outcome {
        Outcome::Success { json, snapshot } => {
            println!("{}", json);
            if let Some(registry) = &registry {
                registry.record(&snapshot);
            }
            0
        }
        Outcome::Failure { json, failure, kind } => {
            println!("{}", json);
            if let Some(registry) = &registry {
                registry.record(&MetricsSnapshot::failed(kind));
            }
            if failure.is_client_error() {
                2
            } else {
                1
            }
        }
    };

    if cli.metrics_port != 0 {
        if let Some(registry) = registry {
            serve_metrics(cli.metrics_port, registry);
        }
    }

    std::process::exit(exit_code);
}

fn execute(
    command: &Command,
    config: &FileConfig,
    rng: &mut ClassicalRng,
    hardware: Arc<dyn QuantumService>,
) -> Result<Outcome, String> {
    let run_rng = ClassicalRng::seed_from_u64(rng.next_u64());

    let outcome = match command {
        Command::Simulate(args) => {
            let mut request = config.simulation.request();
            apply_overrides(&mut request, args);
            if let Some(key) = &args.api_key {
                request.api_key = Some(key.clone());
            }

            let mut orchestrator = config.simulation_orchestrator(run_rng, hardware);
            match orchestrator.run(&request) {
                Ok(result) => Outcome::Success {
                    json: render(&result),
                    snapshot: MetricsSnapshot::from_simulation(&result),
                },
                Err(failure) => Outcome::Failure {
                    json: render(&failure),
                    failure,
                    kind: RunKind::Simulation,
                },
            }
        }
        Command::Testbed { photon_rate, api_key } => {
            let photon_rate = photon_rate.unwrap_or(config.testbed.photon_rate);

            let mut testbed = config.testbed_orchestrator(run_rng, hardware);
            match testbed.analyze_lab(photon_rate, api_key.as_deref()) {
                Ok(report) => Outcome::Success {
                    json: render(&report),
                    snapshot: MetricsSnapshot::from_testbed(&report),
                },
                Err(failure) => Outcome::Failure {
                    json: render(&failure),
                    failure,
                    kind: RunKind::Testbed,
                },
            }
        }
        Command::Mobile { batch, device_id } => {
            let batch: MobileMeasurementBatch = read_json(batch)?;

            let mut testbed = config.testbed_orchestrator(run_rng, hardware);
            match testbed.analyze_mobile(&batch, device_id) {
                Ok(report) => Outcome::Success {
                    json: render(&report),
                    snapshot: MetricsSnapshot::from_mobile(&report),
                },
                Err(failure) => Outcome::Failure {
                    json: render(&failure),
                    failure,
                    kind: RunKind::Testbed,
                },
            }
        }
        Command::Detections { file, simulate } => {
            let batch = match (file, simulate) {
                (_, true) => DetectionBatch::synthetic(&format!("{:016x}", rng.next_u64())),
                (Some(path), false) => read_json(path)?,
                (None, false) => return Err("detections needs a file or --simulate".to_string()),
            };

            let mut testbed = config.testbed_orchestrator(run_rng, hardware);
            let report = testbed.summarize_detections(&batch);
            Outcome::Success {
                json: render(&report),
                snapshot: MetricsSnapshot {
                    kind: RunKind::Testbed,
                    succeeded: true,
                    secure: report.summary.device_qber < config.testbed.qber_threshold,
                    qber: Some(report.summary.device_qber),
                    sifted_length: None,
                    bit_source: None,
                    suitability_score: None,
                },
            }
        }
    };
    Ok(outcome)
}

fn apply_overrides(request: &mut bb84_qkd::SimulationRequest, args: &SimulateArgs) {
    if let Some(scenario) = args.scenario {
        request.scenario = scenario;
    }
    if let Some(bits) = &args.bits {
        request.bits = bits.clone();
    }
    if let Some(bases) = &args.bases {
        request.bases = bases.clone();
    }
    if let Some(n) = args.num_qubits {
        request.num_qubits = n;
    }
    if let Some(rng_type) = args.rng_type {
        request.rng_type = rng_type;
    }
    if let Some(rate) = args.photon_rate {
        request.photon_rate = rate;
    }
    if let Some(count) = args.photon_count {
        request.photon_count = count;
    }
    if let Some(method) = args.generation_method {
        request.generation_method = method;
    }
    if let Some(distance) = args.distance {
        request.distance = distance;
    }
    if let Some(noise) = args.noise {
        request.noise = noise;
    }
    if let Some(attack) = args.eve_attack {
        request.eve_attack = attack;
    }
    if let Some(method) = args.error_correction {
        request.error_correction = method;
    }
    if let Some(method) = args.privacy_amplification {
        request.privacy_amplification = method;
    }
    if let Some(backend) = args.backend_type {
        request.backend_type = backend;
    }
}

#[cfg(feature = "metrics")]
fn serve_metrics(port: u16, registry: MetricsRegistry) {
    use bb84_qkd::metrics::{ExporterConfig, MetricsExporter};

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("Failed to start metrics runtime: {}", e);
            return;
        }
    };
    info!("Serving metrics on port {} until Ctrl-C", port);
    let exporter = MetricsExporter::new(ExporterConfig::public(port), Arc::new(registry));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
        }
    };
    if let Err(e) = runtime.block_on(exporter.serve(shutdown)) {
        warn!("Metrics exporter failed: {}", e);
    }
}

#[cfg(not(feature = "metrics"))]
fn serve_metrics(_port: u16, _registry: MetricsRegistry) {
    warn!("Built without the `metrics` feature; --metrics-port ignored");
}
