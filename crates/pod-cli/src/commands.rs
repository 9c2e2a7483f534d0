use anyhow::Context;
use colored::Colorize;
use pod_server::{PodServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            ServerConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(ServerConfig::default()),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.validate()?;
    println!(
        "{} Pod server on {} ({} shapes)",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.shapes.len()
    );

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(PodServer::new(config).serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(Some(&args.config))?;
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(PodServer::new(config.clone()).build_state())?;
    println!(
        "{} {} is valid: {} methods, {} shapes",
        "✓".green().bold(),
        args.config.display().to_string().bold(),
        config.supported_methods.len(),
        config.shapes.len()
    );
    for shape in &config.shapes {
        println!("  {} {}", "shape:".cyan(), shape.id);
    }
    Ok(())
}
