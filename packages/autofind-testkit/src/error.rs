pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid AUTOFIND_PG_DSN: {message}")]
	InvalidDsn { message: String },
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Failed to start cleanup runtime: {0}")]
	Runtime(#[from] std::io::Error),
}
