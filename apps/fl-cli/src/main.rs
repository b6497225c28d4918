use clap::{Parser, Subcommand, ValueEnum};
use fl_app::{
    AppError, AppResult, FlowReport, PropagationReport, RunMode, RunOptions, RunProgressEvent,
    RunReport, RunRequest, RunResponse, RunStage, project_service, run_service,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "feedline")]
#[command(about = "Feed-line pressure budget and flow-rate tool", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Overridden by RUST_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// List the chain components in flow order
    Components {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Propagate the boundary condition back to the source
    Propagate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Override the boundary mass flow [kg/s]
        #[arg(long)]
        mdot: Option<f64>,
        /// Print the pressure after every component
        #[arg(long)]
        trace: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Search the mass flow a given source pressure delivers
    SolveFlow {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Target source pressure [Pa]; defaults to the project's solver target
        #[arg(long)]
        target_pa: Option<f64>,
        /// Print the pressure after every component of the converged run
        #[arg(long)]
        trace: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Components { project_path } => cmd_components(&project_path),
        Commands::Propagate {
            project_path,
            mdot,
            trace,
            format,
        } => cmd_run(
            &project_path,
            RunMode::Propagate,
            RunOptions {
                record_trace: trace,
                mass_flow_kgps: mdot,
                ..RunOptions::default()
            },
            format,
        ),
        Commands::SolveFlow {
            project_path,
            target_pa,
            trace,
            format,
        } => cmd_run(
            &project_path,
            RunMode::SolveFlow { target_pa },
            RunOptions {
                record_trace: trace,
                ..RunOptions::default()
            },
            format,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("error: {err}");
            exit_code_for(&err)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// 2: bad project, 3: chain misconfigured, 4: flow search did not converge.
fn exit_code_for(err: &AppError) -> ExitCode {
    match err {
        AppError::Configuration(_) => ExitCode::from(3),
        AppError::Convergence(_) => ExitCode::from(4),
        AppError::Validation(_) | AppError::Project(_) | AppError::ProjectFileRead { .. } => {
            ExitCode::from(2)
        }
        _ => ExitCode::FAILURE,
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    tracing::debug!(project = %project.name, version = project.version, "project validated");
    println!(
        "✓ Project is valid ({} components, {} substances)",
        project.components.len(),
        project.substances.len()
    );
    Ok(())
}

fn cmd_components(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let components = project_service::list_components(&project);

    println!("Chain of {} (source first):", project.name);
    for c in components {
        println!("  {:>2}  {:<6} {:<16} {}", c.position, c.id, c.kind, c.detail);
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    mode: RunMode,
    options: RunOptions,
    format: OutputFormat,
) -> AppResult<()> {
    tracing::info!(
        project = %project_path.display(),
        mode = mode.label(),
        trace = options.record_trace,
        "starting run"
    );
    let request = RunRequest {
        project_path,
        mode,
        options,
    };

    let interactive = format == OutputFormat::Text;
    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event: RunProgressEvent| {
            if !interactive {
                return;
            }
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    if interactive {
        clear_progress_line();
    }

    match format {
        OutputFormat::Text => print_text(&response),
        OutputFormat::Yaml => print_serialized(&response, |r| {
            serde_yaml::to_string(r).map_err(|e| e.to_string())
        })?,
        OutputFormat::Json => print_serialized(&response, |r| {
            serde_json::to_string_pretty(r).map_err(|e| e.to_string())
        })?,
    }
    Ok(())
}

fn print_serialized<T: Serialize>(
    value: &T,
    encode: impl FnOnce(&T) -> Result<String, String>,
) -> AppResult<()> {
    let text = encode(value).map_err(AppError::InvalidInput)?;
    println!("{text}");
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.flow) {
        (RunStage::SearchingFlow, Some(f)) => {
            print!(
                "\rsearching  iter={}/{}  mdot={:.4} kg/s  p={:.2} bar  err={:.2}%  step={:.2e}  elapsed={:.1}s",
                f.iteration,
                f.max_iterations,
                f.mass_flow_kgps,
                f.source_pressure_pa / 1e5,
                f.rel_error * 100.0,
                f.step_kgps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {msg}"));
            }
            print!("{line}");
        }
    }
    let _ = io::stdout().flush();
}

fn print_text(response: &RunResponse) {
    match &response.report {
        RunReport::Propagation(report) => {
            println!("✓ Propagation completed: {}", response.project);
            print_propagation(report);
        }
        RunReport::Flow(report) => {
            println!("✓ Flow search converged: {}", response.project);
            print_flow(report);
        }
    }
    println!(
        "  Timing: compile {:.3}s, solve {:.3}s, total {:.3}s",
        response.timing.compile_time_s, response.timing.solve_time_s, response.timing.total_time_s
    );
}

fn print_flow(report: &FlowReport) {
    println!(
        "  Mass flow:       {:.4} kg/s ({} iterations)",
        report.mass_flow_kgps, report.iterations
    );
    println!(
        "  Source pressure: {:.3} bar (target {:.3} bar, error {:.2}%)",
        report.source_pressure_pa / 1e5,
        report.target_pressure_pa / 1e5,
        report.rel_error * 100.0
    );
    print_propagation(&report.propagation);
}

fn print_propagation(report: &PropagationReport) {
    match &report.source {
        Some(source) => {
            print!("  Source: {} (position {})", source.id, source.position);
            if let Some(p) = source.nominal_pressure_pa {
                print!(", nominal {:.2} bar", p / 1e5);
            }
            println!();
        }
        None => println!("  Source: none reached, values are at the chain head"),
    }
    println!(
        "  Required pressure: {:.3} bar",
        report.required_pressure_pa / 1e5
    );
    println!(
        "  Mass flow at source: {:.5} kg/s of {} at {:.1} K",
        report.mass_flow_kgps, report.substance, report.temperature_k
    );

    if !report.triggered_reliefs.is_empty() {
        println!("  Relief devices triggered: {}", report.triggered_reliefs.join(", "));
    }
    if !report.warnings.is_empty() {
        println!("  Warnings ({}):", report.warnings.len());
        for w in &report.warnings {
            println!("    - {w}");
        }
    }
    if !report.trace.is_empty() {
        println!("  Trace (terminal end first):");
        println!(
            "    {:>3} {:<6} {:<16} {:<9} {:>12} {:>12} {:>10}",
            "pos", "id", "kind", "step", "dp [bar]", "p [bar]", "mdot"
        );
        for row in &report.trace {
            println!(
                "    {:>3} {:<6} {:<16} {:<9} {:>12.4} {:>12.4} {:>10.5}",
                row.position,
                row.id,
                row.kind,
                row.step,
                row.pressure_delta_pa / 1e5,
                row.pressure_pa / 1e5,
                row.mass_flow_kgps
            );
        }
    }
}
