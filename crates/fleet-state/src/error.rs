use fleet_core::{DriverId, DriverStatus};
use thiserror::Error;

use crate::ActionKind;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("driver {0} is not in the store")]
    UnknownDriver(DriverId),

    #[error("cannot {action} driver {driver} while it is {status}")]
    InvalidTransition {
        driver: DriverId,
        status: DriverStatus,
        action: ActionKind,
    },

    #[error("no driver is selected")]
    NothingSelected,
}

pub type StateResult<T> = Result<T, StateError>;
