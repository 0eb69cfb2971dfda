//! Bot commands: the catalog the model chooses from, the handlers that run
//! them, and the dispatcher that executes a batch in order.

pub mod catalog;
pub mod dispatcher;
pub mod handlers;
pub mod registry;
pub mod traits;
pub mod types;

pub use catalog::{CommandCatalog, CommandClass, CommandSpec, ParamSpec};
pub use dispatcher::{CommandDispatcher, DispatchReport};
pub use registry::CommandRegistry;
pub use traits::CommandHandler;
pub use types::{Command, CommandFailure, CommandOutcome};
