//! Sift command-line front end.
//!
//! Runs one search against a fixture catalog and prints the published result
//! set as JSON. Logs go to stderr.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use sift_search::{DiscoveryService, Fixtures, SearchConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if cli.verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let config = match &cli.config {
		Some(path) => SearchConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
		None => SearchConfig::default(),
	};
	let fixtures = Fixtures::load(&cli.fixtures).with_context(|| format!("loading fixtures {}", cli.fixtures.display()))?;

	let service = DiscoveryService::new(fixtures.into_adapters(), config);
	let query = cli.initial_query();
	info!(text = %query.text, category = %query.category, page = query.page, "sift.start");

	let mut ticket = service.search(query.text, query.category, query.filters, query.page);
	if let Some(category) = cli.view_more {
		ticket.wait().await.context("search service stopped before publishing")?;
		ticket = service.view_more(category);
	}

	let set = ticket.wait().await.context("search service stopped before publishing")?;
	if set.partial {
		info!(failed = set.failures.len(), "sift.partial");
	}
	println!("{}", serde_json::to_string_pretty(&*set)?);
	Ok(())
}
