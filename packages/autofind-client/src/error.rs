use autofind_domain::Reply;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Transport failed after {attempts} attempts: {message}")]
	Transport { attempts: u32, message: String },
	#[error("Empty response from server.")]
	EmptyResponse,
	#[error("Invalid response from server: {message}")]
	Decode { message: String },
}
impl Error {
	/// The `{"erro": ...}` reply a caller can treat like any server-side error.
	pub fn to_reply(&self) -> Reply {
		Reply::error(self.to_string())
	}

	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport { .. })
	}
}

/// Failure of a single attempt. Every variant is retried.
#[derive(Debug, thiserror::Error)]
pub(crate) enum AttemptError {
	#[error("{0}")]
	Io(#[from] std::io::Error),
	#[error("Timed out after {timeout_ms} ms.")]
	TimedOut { timeout_ms: u64 },
}
