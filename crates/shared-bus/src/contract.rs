//! # Payload Contracts
//!
//! The bus does not validate payloads at runtime. Contracts exist so tests and
//! test doubles can catch drift between a producer and its consumers before
//! the two are deployed separately.

use thiserror::Error;

use crate::events::{Payload, Topic};

/// Schema version and required top-level fields of a topic's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadContract {
    pub schema_version: u16,
    pub required_fields: &'static [&'static str],
}

impl PayloadContract {
    #[must_use]
    pub const fn new(schema_version: u16, required_fields: &'static [&'static str]) -> Self {
        Self {
            schema_version,
            required_fields,
        }
    }
}

/// A payload that does not satisfy its topic's contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("{topic}: payload must be a JSON object")]
    NotAnObject { topic: Topic },

    #[error("{topic}: missing required field(s) {missing:?} (schema v{schema_version})")]
    MissingFields {
        topic: Topic,
        schema_version: u16,
        missing: Vec<&'static str>,
    },
}

/// Check `payload` against the contract of `topic`.
pub fn validate_payload(topic: Topic, payload: &Payload) -> Result<(), ContractViolation> {
    let contract = topic.contract();
    let Some(object) = payload.as_object() else {
        return Err(ContractViolation::NotAnObject { topic });
    };

    let missing: Vec<_> = contract
        .required_fields
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ContractViolation::MissingFields {
            topic,
            schema_version: contract.schema_version,
            missing,
        })
    }
}
