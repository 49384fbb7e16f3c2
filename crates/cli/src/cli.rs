use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use sift_primitives::{Category, Filters, SearchQuery};
use sift_search::QueryState;

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Federated search over creators, users, posts and products")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Search text
	pub text: Option<String>,

	/// JSON fixture catalog with creators, users, posts and products sections
	#[arg(long, value_name = "FILE")]
	pub fixtures: PathBuf,

	/// TOML search configuration
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Seed the query from a `?q=&type=` string; other flags override it
	#[arg(long, value_name = "QUERY_STRING")]
	pub url: Option<String>,

	/// Category tab (all, creators, users, posts, products)
	#[arg(long = "type", short = 't', value_name = "CATEGORY")]
	pub category: Option<Category>,

	/// Drill-down page
	#[arg(long, value_name = "N")]
	pub page: Option<u32>,

	/// Filter as KEY=VALUE; VALUE is JSON when it parses, a string otherwise
	#[arg(long = "filter", short = 'f', value_name = "KEY=VALUE", value_parser = parse_filter)]
	pub filters: Vec<(String, Value)>,

	/// After the first search, drill into this category
	#[arg(long, value_name = "CATEGORY")]
	pub view_more: Option<Category>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

impl Cli {
	/// Query to dispatch first: the URL seed, if any, with explicit flags applied on top.
	pub fn initial_query(&self) -> SearchQuery {
		let mut state = self.url.as_deref().map(QueryState::from_url_query).unwrap_or_default();
		if let Some(text) = &self.text {
			state.set_text(text.as_str());
		}
		if let Some(category) = self.category {
			state.set_category(category);
		}
		if !self.filters.is_empty() {
			state.set_filters(self.filters.iter().cloned().collect::<Filters>());
		}
		if let Some(page) = self.page {
			state.set_page(page);
		}
		state.snapshot()
	}
}

/// Parses `KEY=VALUE`, reading VALUE as JSON when possible.
pub fn parse_filter(raw: &str) -> Result<(String, Value), String> {
	let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
	let key = key.trim();
	if key.is_empty() {
		return Err(format!("empty filter key in '{raw}'"));
	}
	let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
	Ok((key.to_string(), value))
}
