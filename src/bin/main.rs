use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(about = "End-to-end storefront checks from a YAML suite")]
#[command(version)]
struct Cli {
    /// Suite config to run
    config: PathBuf,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config and fixtures without launching a browser
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> shopcheck::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let params = shopcheck::Params::from_args(&cli.params)?;
    let mut config = shopcheck::Config::load_with_params(&cli.config, &params)?;

    // Fixture paths are relative to the config file
    let base_path = cli.config.parent().unwrap_or_else(|| Path::new("."));
    let fixtures = shopcheck::Fixtures::load(base_path, &config.fixtures)?;

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  Target: {}", config.target.url);
        println!(
            "  Locale: {} / {} / {}",
            config.locale.language, config.locale.city, config.locale.area
        );
        println!("  Login fixture: {}", config.fixtures.login);
        println!("  Profile fixture: {}", config.fixtures.profile);
        println!("  Steps: {}", config.steps.len());
        for (i, step) in config.steps.iter().enumerate() {
            println!("    {}. {}", i + 1, step.name());
        }
        if !config.params.is_empty() {
            println!("  Parameters: {}", config.params.len());
            for (name, def) in &config.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        if config.attempts() > 1 {
            println!("  Retry attempts: {}", config.attempts());
        }
        return Ok(());
    }

    if cli.headless {
        config.browser.headless = true;
    }

    println!("Running: {}", config.name);

    let mut suite = shopcheck::Suite::launch(&config.browser).await?;
    let result = suite.run(&config, &fixtures).await?;

    println!();
    if result.success {
        println!("✓ Success");
    } else {
        println!("✗ Failed");
        if let Some(ref error) = result.error {
            println!("  Error: {}", error);
        }
    }
    println!("{}", result.summary);
    if result.retries > 0 {
        println!("  Retries: {}", result.retries);
    }

    let report = result.summary.write_to(&config.report.dir)?;
    println!("  Summary: {}", report.display());

    suite.close().await?;

    if !result.success {
        std::process::exit(1);
    }

    Ok(())
}
