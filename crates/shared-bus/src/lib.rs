//! # Shared Bus - Cross-Fragment Event Bus
//!
//! Lets independently deployed fragments notify each other of domain events
//! without holding references to one another.
//!
//! ## Rules
//!
//! - Fragments talk to each other through the bus ONLY.
//! - Topics come from the catalogue (`Topic`), never from string literals.
//! - The bus is created once by the host and injected; there is no global.
//!
//! ## Choreography
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   workout    │                    │  analytics   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Synchronous, in registration order, snapshot taken at dispatch start.
//! - A failing or panicking listener is isolated and reported to an
//!   `ErrorReporter`; the publisher never sees it.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod contract;
pub mod events;
pub mod publisher;
pub mod reporter;
pub mod scope;
pub mod subscriber;

// Re-export main types
pub use contract::{validate_payload, ContractViolation, PayloadContract};
pub use events::{EventEnvelope, Payload, Topic, UnknownTopic, CATALOGUE_VERSION};
pub use publisher::{panic_message, BusError, EventBus, EventPublisher};
pub use reporter::{CollectingReporter, ErrorReporter, ListenerFailure, TracingReporter};
pub use scope::ScopedBus;
pub use subscriber::{ListenerError, ListenerResult, Subscription, SubscriptionId};
