pub mod provider;
pub mod types;

pub use provider::{ContextProvider, LocationTables};
pub use types::{ContextSignals, EventInfo, Season};
