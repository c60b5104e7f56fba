// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk — label printer capability negotiation
//
// Entry point. Initialises logging, loads configuration, and runs one
// operator command against the built-in driver registry.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use labelwerk_core::error::Result;
use labelwerk_core::human_errors::humanize_error;
use labelwerk_core::{LabelwerkError, ServiceConfig};
use labelwerk_driver::{AttributeStore, DriverLifecycle, NullDevice, Printer};

#[derive(Parser)]
#[command(author, version, about = "Label printer driver registry and capability negotiation")]
struct Args {
    /// Configuration file (JSON)
    #[arg(long, short, env = "LABELWERK_CONFIG", default_value = "labelwerk.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered driver
    Drivers {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the attributes a printer advertises with a driver attached
    Attributes {
        /// Driver keyword (defaults to the configured driver)
        #[arg(long, short)]
        driver: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach the configured driver and device, then detach
    Attach,
    /// Write a default configuration file
    InitConfig,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match ServiceConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            // Logging isn't up yet; report directly.
            report(&e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, config: &ServiceConfig) -> Result<()> {
    let lifecycle = DriverLifecycle::builtin()?;

    match args.command {
        Commands::Drivers { json } => {
            let entries = lifecycle.registry().entries();
            if json {
                println!("{}", serde_json::to_string_pretty(entries)?);
            } else {
                for entry in entries {
                    println!("{:<28} {:<5} {}", entry.keyword, entry.family.name(), entry.model);
                }
            }
        }

        Commands::Attributes { driver, json } => {
            let keyword = driver
                .or_else(|| config.driver.clone())
                .ok_or_else(|| LabelwerkError::Config("no driver given or configured".into()))?;

            let printer = Printer::new(config.printer_name.as_str());
            if lifecycle.attach(&printer, Some(keyword.as_str()))?.is_none() {
                return Err(LabelwerkError::Config(format!("unknown driver: {keyword}")));
            }
            let attrs = printer.attributes()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&attrs)?);
            } else {
                print_attributes(&attrs);
            }
            lifecycle.detach_printer(&printer)?;
        }

        Commands::Attach => {
            let printer = Printer::new(config.printer_name.as_str());
            if let Some(keyword) = &config.driver {
                printer.set_driver_keyword(keyword)?;
            }
            let Some(driver) = lifecycle.attach_configured(&printer)? else {
                println!("{}: no driver attached", printer.name());
                return Ok(());
            };
            if let Some(uri) = &config.device_uri {
                driver.set_device(Box::new(NullDevice::new(uri.as_str())))?;
            }
            println!(
                "{}: {} ({}) attached at {} as {}",
                printer.name(),
                lifecycle.make_and_model(Some(&*driver)),
                driver.family().name(),
                driver.attached_at().to_rfc3339(),
                driver.id(),
            );
            drop(driver);
            lifecycle.detach_printer(&printer)?;
        }

        Commands::InitConfig => {
            ServiceConfig::default().save(&args.config)?;
            info!(path = %args.config.display(), "default configuration written");
        }
    }
    Ok(())
}

/// One line per attribute: name, tag, values.
fn print_attributes(attrs: &AttributeStore) {
    for attr in attrs.iter() {
        let values = serde_json::to_string(&attr.values).unwrap_or_default();
        println!("{:<44} {:<16} {}", attr.name, format!("{:?}", attr.tag), values);
    }
    println!("fingerprint {}", attrs.fingerprint());
}

fn report(err: &LabelwerkError) {
    let human = humanize_error(err);
    eprintln!("error: {}", human.message);
    eprintln!("  {}", human.suggestion);
}
