pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<autofind_storage::Error> for Error {
	fn from(err: autofind_storage::Error) -> Self {
		match err {
			autofind_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			autofind_storage::Error::Domain(inner) =>
				Self::InvalidRequest { message: inner.to_string() },
			autofind_storage::Error::InvalidRow(message) => Self::Storage { message },
		}
	}
}

impl From<autofind_domain::Error> for Error {
	fn from(err: autofind_domain::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
