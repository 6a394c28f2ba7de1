//! # Integration Scenarios
//!
//! - `bus_scenarios` - delivery, isolation and payload contracts
//! - `registry_scenarios` - single-flight loading and retry
//! - `shell_flows` - the full shell driven through navigation

mod bus_scenarios;
mod registry_scenarios;
mod shell_flows;
