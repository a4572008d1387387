mod history_interface;
mod history_item;
mod history_store;
mod inverse_log;

pub use history_interface::*;
pub use history_item::*;
pub use history_store::*;
pub use inverse_log::*;
