//! Session state shared with the rest of the application.
//!
//! The credential store and the page location are traits so hosts can plug
//! their own storage and navigation; [`SessionStorage`] and [`MemoryLocation`]
//! are the in-memory implementations.

mod credential;
pub use self::credential::{CredentialStore, SessionStorage};

mod location;
pub use self::location::{Location, MemoryLocation};

mod guard;
pub use self::guard::{SessionGuard, login_target};

mod gate;
pub use self::gate::RouteGate;
