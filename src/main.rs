use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use test_forge::prompt::{DEFAULT_SCENARIO, GenerationRequest, build_prompt};
use test_forge::{Config, Driver, ForgeError, Framework, GeminiClient, scan_project};

/// test-forge - Generate and self-repair end-to-end browser tests
#[derive(Parser, Debug)]
#[command(
    name = "test-forge",
    version,
    about = "Generate and self-repair end-to-end browser tests for multiple frameworks",
    after_help = "ENVIRONMENT VARIABLES:\n\
        TEST_FORGE_API_KEY           Generative service credential (or GEMINI_API_KEY)\n\
        TEST_FORGE_MODEL             Model identifier\n\
        TEST_FORGE_ENDPOINT          API base URL\n\
        TEST_FORGE_REQUEST_TIMEOUT   HTTP timeout in seconds\n\
        TEST_FORGE_MAX_ATTEMPTS      Attempts per framework\n\
        TEST_FORGE_MAX_SCRIPT_BYTES  Largest accepted generated script\n\
        TEST_FORGE_PROJECT_ROOT      Project root to scan\n\
        TEST_FORGE_OUTPUT_DIR        Directory for generated scripts\n\
        TEST_FORGE_FRAMEWORKS        Frameworks for `run` (comma-separated)\n\
        RUST_LOG                     Log filter (default: info)"
)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate, run and repair tests for one or more frameworks
    Run {
        /// Frameworks to target (default: all). Repeatable or comma-separated.
        #[arg(short, long, value_delimiter = ',', env = "TEST_FORGE_FRAMEWORKS")]
        framework: Vec<String>,

        /// Scenario text
        #[arg(short, long, conflicts_with = "scenario_file")]
        scenario: Option<String>,

        /// Read the scenario from a file
        #[arg(long)]
        scenario_file: Option<PathBuf>,

        /// Attempts per framework
        #[arg(short = 'n', long, env = "TEST_FORGE_MAX_ATTEMPTS")]
        max_attempts: Option<u32>,

        /// Project root to scan for context
        #[arg(short, long, env = "TEST_FORGE_PROJECT_ROOT")]
        project_root: Option<PathBuf>,

        /// Directory (relative to the project root) for generated scripts
        #[arg(short, long, env = "TEST_FORGE_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print the report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the project context manifest
    Scan {
        /// Project root to scan
        #[arg(short, long)]
        project_root: Option<PathBuf>,
    },

    /// Print the prompt that would be sent for a framework
    Prompt {
        /// Target framework
        #[arg(short, long)]
        framework: String,

        /// Previous error text to include as feedback
        #[arg(short, long)]
        error: Option<String>,

        /// Scenario text
        #[arg(short, long)]
        scenario: Option<String>,

        /// Project root to scan for context
        #[arg(short, long)]
        project_root: Option<PathBuf>,
    },

    /// List supported frameworks
    Frameworks,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            let fatal = e
                .downcast_ref::<ForgeError>()
                .map(|fe| matches!(fe, ForgeError::MissingCredential | ForgeError::ProjectRoot { .. }))
                .unwrap_or(false);
            if fatal { ExitCode::from(2) } else { ExitCode::FAILURE }
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn Error>> {
    let mut config = Config::from_env();

    match args.command {
        Some(Commands::Run {
            framework,
            scenario,
            scenario_file,
            max_attempts,
            project_root,
            output_dir,
            report,
            json,
        }) => {
            if let Some(n) = max_attempts {
                config = config.max_attempts(n);
            }
            if let Some(root) = project_root {
                config = config.project_root(root);
            }
            if let Some(dir) = output_dir {
                config = config.output_dir(dir);
            }

            let frameworks = parse_frameworks(&framework)?;
            let scenario = resolve_scenario(scenario, scenario_file.as_deref())?;

            // Credential is checked before any loop runs
            let api_key = config.require_api_key()?;
            let client = GeminiClient::new(api_key, &config.model)?;
            let driver = Driver::from_config(&config, Arc::new(client), scenario);

            let result = driver.run(&frameworks).await?;

            if let Some(path) = &report {
                result.write_json(path)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", result.summary());
                if let Some(path) = &report {
                    println!("\nReport: {}", path.display());
                }
            }

            Ok(if result.all_succeeded() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }

        Some(Commands::Scan { project_root }) => {
            let root = project_root.unwrap_or(config.paths.project_root);
            println!("{}", scan_project(&root)?);
            Ok(ExitCode::SUCCESS)
        }

        Some(Commands::Prompt {
            framework,
            error,
            scenario,
            project_root,
        }) => {
            let framework: Framework = framework.parse()?;
            let root = project_root.unwrap_or(config.paths.project_root);
            let manifest = scan_project(&root)?;

            let mut request =
                GenerationRequest::new(framework, scenario.unwrap_or_else(|| DEFAULT_SCENARIO.to_string()));
            if let Some(error) = error {
                request = request.with_prior_error(error);
            }

            println!("{}", build_prompt(&request, &manifest, &config.paths.output_dir));
            println!("--- scenario ---\n{}", request.scenario);
            Ok(ExitCode::SUCCESS)
        }

        Some(Commands::Frameworks) => {
            for fw in Framework::ALL {
                let spec = fw.spec();
                println!(
                    "{:<12} {:<20} {}/{:<22} {}",
                    spec.id,
                    spec.display_name,
                    spec.subdir,
                    spec.output_file,
                    fw.run_command(spec.output_file)
                );
            }
            Ok(ExitCode::SUCCESS)
        }

        None => {
            println!("test-forge - Generate and self-repair end-to-end browser tests");
            println!();
            println!("Usage: test-forge <COMMAND>");
            println!();
            println!("Commands:");
            println!("  run         Generate, run and repair tests for each framework");
            println!("  scan        Print the project context manifest");
            println!("  prompt      Print the prompt for a framework (dry run)");
            println!("  frameworks  List supported frameworks");
            println!();
            println!("Run with --help for more information.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn parse_frameworks(names: &[String]) -> Result<Vec<Framework>, ForgeError> {
    if names.is_empty() {
        return Ok(Framework::ALL.to_vec());
    }

    let mut frameworks = Vec::new();
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        let fw: Framework = name.parse()?;
        if !frameworks.contains(&fw) {
            frameworks.push(fw);
        }
    }
    Ok(frameworks)
}

fn resolve_scenario(text: Option<String>, file: Option<&Path>) -> Result<String, Box<dyn Error>> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read scenario file {}: {}", path.display(), e))?;
            if content.trim().is_empty() {
                return Err(format!("Scenario file {} is empty", path.display()).into());
            }
            Ok(content)
        }
        (None, None) => Ok(DEFAULT_SCENARIO.to_string()),
    }
}
