use anyhow::{bail, Context, Result};
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub delay_ms: Option<u64>,
    pub no_journal: bool,
    pub help: bool,
}

/// Parse command-line arguments (without the program name).
///
/// Supported forms:
///   testrail-migrate
///   testrail-migrate --config ./migration.toml
///   testrail-migrate --delay-ms 500 --no-journal
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => parsed.help = true,
            "-c" | "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("Missing value for --config flag");
                };
                parsed.config = Some(PathBuf::from(path));
            }
            "--delay-ms" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    bail!("Missing value for --delay-ms flag");
                };
                let ms = value
                    .parse()
                    .with_context(|| format!("Invalid --delay-ms value: {value}"))?;
                parsed.delay_ms = Some(ms);
            }
            "--no-journal" => parsed.no_journal = true,
            other => bail!("Unknown argument: {other}\n\nRun with --help for usage."),
        }
        i += 1;
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "testrail-migrate — copy TestRail sections and cases into Azure DevOps test suites\n"
    );
    println!("USAGE:");
    println!("  testrail-migrate [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -c, --config <path>  Config file (default ~/.testrail-migrate/config.toml)");
    println!("      --delay-ms <n>   Pause between API requests, overrides the config");
    println!("      --no-journal     Don't append to the activity journal");
    println!("  -h, --help           Show this help");
    println!();
    println!("LOGGING:");
    println!("  Set RUST_LOG (e.g. RUST_LOG=debug) to change log verbosity.");
}
