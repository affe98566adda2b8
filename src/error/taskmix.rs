use thiserror::Error;

/// Construction-time violations of the task mix; fatal to the arbiter constructor.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TaskMixError {
    #[error("Task profile list must not be empty.")]
    Empty,
    #[error("Task profiles must be indexed 0..n by typeID; expected {expected}, found {found}.")]
    NonConsecutiveTypeId { expected: u32, found: u32 },
    #[error("Task profile {type_id} has a negative percentage: {percentage}.")]
    NegativePercentage { type_id: u32, percentage: f64 },
    #[error("Task profile percentages must sum to 1.0, got {total}.")]
    PercentagesDoNotSumToOne { total: f64 },
}
