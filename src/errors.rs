use snafu::Snafu;

pub type CustomResult<T> = Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} must be set", var))]
    MissingConfigError { var: String },

    #[snafu(display("invalid value `{}` for {}", value, var))]
    InvalidConfigError { var: String, value: String },

    #[snafu(display("could not get a database connection: {}", source))]
    PoolError { source: diesel::r2d2::PoolError },

    #[snafu(display("database query failed: {}", source))]
    QueryError { source: diesel::result::Error },

    #[snafu(display("rejected row from {}: {}", table, reason))]
    InvalidRowError { table: String, reason: String },

    #[snafu(display("store is unavailable"))]
    StoreUnavailableError,

    #[snafu(display("could not read {}: {}", path, source))]
    ReadFileError { path: String, source: std::io::Error },

    #[snafu(display("{} is not a list of odds quotes: {}", path, source))]
    ParseFileError { path: String, source: serde_json::Error },

    #[snafu(display("store task did not complete: {}", source))]
    TaskError { source: tokio::task::JoinError },
}
