pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid vehicle: {field} {message}")]
	InvalidVehicle { field: &'static str, message: String },
}
