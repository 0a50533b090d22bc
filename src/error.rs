use thiserror::Error;

use crate::grid::GridError;
use crate::input::InputError;
use crate::stack::EmptyStack;

/// Anything a day's payload can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    EmptyStack(#[from] EmptyStack),
    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
