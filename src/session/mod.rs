//! Session persistence and the provider handed to the HTTP client.

mod provider;
mod store;

pub use provider::SessionProvider;
pub use provider::StoredSessions;
pub use store::SessionStore;
