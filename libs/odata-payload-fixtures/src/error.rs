/// Errors raised while building fixtures.
#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error("fixture settings: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error(transparent)]
    Payload(#[from] odata_payload::Error),
}

impl From<figment::Error> for FixtureError {
    fn from(err: figment::Error) -> Self {
        FixtureError::Config(Box::new(err))
    }
}

pub type Result<T, E = FixtureError> = std::result::Result<T, E>;
