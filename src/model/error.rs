use crate::types::variable::Variable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("No observations available to train the {0} model")]
    NoObservations(Variable),

    #[error("Not enough observations to train the {variable} model: found {found}, need at least {required}")]
    InsufficientData {
        variable: Variable,
        found: usize,
        required: usize,
    },

    #[error("Failed to fit the {0} model, its design matrix is singular")]
    Singular(Variable),
}

impl TrainingError {
    pub fn variable(&self) -> Variable {
        match self {
            TrainingError::NoObservations(variable)
            | TrainingError::InsufficientData { variable, .. }
            | TrainingError::Singular(variable) => *variable,
        }
    }
}
