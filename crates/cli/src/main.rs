use clap::Parser;

use milkprice_cli::{Cli, run};
use milkprice_pricing::PricingConfig;

fn main() {
    milkprice_observability::init();

    let cli = Cli::parse();
    let result = PricingConfig::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|config| run(cli.command, config))
        .and_then(|out| Ok(serde_json::to_string_pretty(&out)?));

    match result {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "milkprice failed");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
