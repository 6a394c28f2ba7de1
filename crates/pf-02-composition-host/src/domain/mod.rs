//! Domain layer: route matching and outlet views.

pub mod routes;
pub mod view;

pub use routes::{Route, RouteError, RouteMatch, RouteTable};
pub use view::{RouteErrorKind, RouteView};
