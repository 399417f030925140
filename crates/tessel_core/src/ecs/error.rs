use crate::pool::PoolError;
use thiserror::Error;

/// Errors raised by the world and its registers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("no declared storage '{name}' matches the requested component")]
    UnknownComponent { name: String },

    #[error("register {id} does not exist")]
    UnknownRegister { id: u64 },

    #[error("component storage '{name}' is declared more than once")]
    DuplicateStorage { name: &'static str },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl EcsError {
    pub(crate) fn unknown_component(name: &str) -> Self {
        Self::UnknownComponent {
            name: name.to_string(),
        }
    }
}
