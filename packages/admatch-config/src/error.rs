pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unable to read matcher config at {path:?}.")]
	ReadConfig { path: std::path::PathBuf, source: std::io::Error },
	#[error("Matcher config at {path:?} is not valid TOML.")]
	ParseConfig { path: std::path::PathBuf, source: toml::de::Error },
	#[error("Invalid matcher config: {message}")]
	Validation { message: String },
}
