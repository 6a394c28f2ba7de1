//! # Pulse Test Suite
//!
//! Cross-crate scenarios that need more than one crate wired together.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (bus fan-out, route matching)
//! └── src/integration/  # Bus, registry and shell scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pulse-tests
//!
//! # By area
//! cargo test -p pulse-tests integration::bus_scenarios
//! cargo test -p pulse-tests integration::shell_flows
//!
//! # Benchmarks
//! cargo bench -p pulse-tests
//! ```

pub mod integration;
