mod auth_api;
mod client;
mod error;
mod resource;
mod token_store;

pub use auth_api::*;
pub use client::*;
pub use error::*;
pub use resource::*;
pub use token_store::*;
