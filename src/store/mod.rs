mod auth_store;
mod loading;
mod notifications;
mod policy_store;
mod process_store;
mod session;
pub(crate) mod utils;
#[cfg(test)]
mod tests;

pub use auth_store::*;
pub use loading::*;
pub use notifications::*;
pub use policy_store::*;
pub use process_store::*;
pub use session::*;
