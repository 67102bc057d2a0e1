#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	Domain(#[from] autofind_domain::Error),
	#[error("Invalid row: {0}")]
	InvalidRow(String),
}
