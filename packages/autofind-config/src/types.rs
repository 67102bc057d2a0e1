use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub client: Client,
	pub catalog: Catalog,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
	#[serde(default = "default_max_frame_bytes")]
	pub max_frame_bytes: usize,
	/// Unset means a stalled client may hold its worker indefinitely.
	pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: u32,
	pub max_limit: u32,
	pub year_window: i32,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_limit: 50, max_limit: 500, year_window: 2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Client {
	pub server_addr: String,
	pub max_attempts: u32,
	pub retry_delay_ms: u64,
	pub timeout_ms: u64,
	pub max_response_bytes: usize,
}
impl Default for Client {
	fn default() -> Self {
		Self {
			server_addr: "127.0.0.1:5050".to_string(),
			max_attempts: 3,
			retry_delay_ms: 2_000,
			timeout_ms: 10_000,
			max_response_bytes: 4 * 1_024 * 1_024,
		}
	}
}

/// Known vocabulary the normalizer corrects against. Declaration order is significant: fuzzy
/// matches resolve to the first brand (and model) listed.
#[derive(Debug, Deserialize)]
pub struct Catalog {
	#[serde(default)]
	pub options: Vec<String>,
	pub brands: Vec<Brand>,
}

#[derive(Debug, Deserialize)]
pub struct Brand {
	pub name: String,
	#[serde(default)]
	pub models: Vec<String>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_frame_bytes() -> usize {
	64 * 1_024
}
