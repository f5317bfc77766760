use std::any::TypeId;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("state not registered: {type_name} ({id:?})")]
    StateNotFound { id: TypeId, type_name: &'static str },

    #[error("compute not registered: {type_name} ({id:?})")]
    ComputeNotFound { id: TypeId, type_name: &'static str },
}

impl Error {
    pub fn state_not_found(id: TypeId, type_name: &'static str) -> Self {
        Self::StateNotFound { id, type_name }
    }

    pub fn compute_not_found(id: TypeId, type_name: &'static str) -> Self {
        Self::ComputeNotFound { id, type_name }
    }
}
