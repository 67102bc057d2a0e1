//! TCP client for the catalog server: one request per connection, retried on transport failures.

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use serde_json::{Map, Value};
use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	net::TcpStream,
	time,
};

use autofind_domain::Reply;

use crate::error::AttemptError;

#[derive(Clone, Debug)]
pub struct CatalogClient {
	cfg: autofind_config::Client,
}
impl CatalogClient {
	pub fn new(cfg: &autofind_config::Client) -> Self {
		Self { cfg: cfg.clone() }
	}

	pub fn with_server_addr(mut self, server_addr: impl Into<String>) -> Self {
		self.cfg.server_addr = server_addr.into();

		self
	}

	pub fn server_addr(&self) -> &str {
		&self.cfg.server_addr
	}

	/// Sends one criteria map. Connection failures, I/O failures and timeouts are retried up to
	/// `max_attempts` times; an empty or undecodable reply is returned immediately.
	pub async fn search(&self, criteria: &Map<String, Value>) -> Result<Reply> {
		let mut payload = serde_json::to_vec(criteria)
			.map_err(|err| Error::Decode { message: err.to_string() })?;

		payload.push(b'\n');

		let attempts = self.cfg.max_attempts.max(1);
		let delay = Duration::from_millis(self.cfg.retry_delay_ms);
		let mut last_failure = String::new();

		for attempt in 1..=attempts {
			match self.attempt(&payload).await {
				Ok(body) => return self.decode(&body),
				Err(err) => {
					tracing::warn!(
						attempt,
						max_attempts = attempts,
						server_addr = %self.cfg.server_addr,
						error = %err,
						"Catalog request attempt failed."
					);

					last_failure = err.to_string();
				},
			}

			if attempt < attempts {
				time::sleep(delay).await;
			}
		}

		Err(Error::Transport { attempts, message: last_failure })
	}

	async fn attempt(&self, payload: &[u8]) -> Result<Vec<u8>, AttemptError> {
		let timeout_ms = self.cfg.timeout_ms;

		time::timeout(Duration::from_millis(timeout_ms), self.exchange(payload))
			.await
			.map_err(|_| AttemptError::TimedOut { timeout_ms })?
	}

	async fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, AttemptError> {
		let mut stream = TcpStream::connect(self.cfg.server_addr.as_str()).await?;

		stream.write_all(payload).await?;
		stream.shutdown().await?;

		let mut body = Vec::new();
		// One byte past the cap is enough to tell an oversized reply apart.
		let cap = self.cfg.max_response_bytes as u64 + 1;

		(&mut stream).take(cap).read_to_end(&mut body).await?;

		Ok(body)
	}

	fn decode(&self, body: &[u8]) -> Result<Reply> {
		if body.len() > self.cfg.max_response_bytes {
			return Err(Error::Decode {
				message: format!("Response exceeds {} bytes.", self.cfg.max_response_bytes),
			});
		}
		if body.iter().all(u8::is_ascii_whitespace) {
			return Err(Error::EmptyResponse);
		}

		serde_json::from_slice(body).map_err(|err| Error::Decode { message: err.to_string() })
	}
}
