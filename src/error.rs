use thiserror::Error;

/// Failure taxonomy for a seeding run.
///
/// `Auth` and `Config` abort the provisioning stage; `Prerequisite`
/// aborts order synthesis; `Request` and `Db` are transient and are
/// caught per unit of work (one account, one order) by the callers.
/// A duplicate-username conflict is not an error at all: creation
/// reports it as a tagged outcome and provisioning falls back to a
/// lookup by username.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("identity provider authentication failed: {0}")]
    Auth(String),

    #[error("missing prerequisite configuration: {0}")]
    Config(String),

    #[error("synthesis prerequisite not met: {0}")]
    Prerequisite(String),

    #[error("identity provider request failed")]
    Request(#[from] reqwest::Error),

    #[error("database error")]
    Db(#[from] sqlx::Error),
}

pub type SeedResult<T> = Result<T, SeedError>;
