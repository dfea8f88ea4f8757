pub mod extract;
pub mod list;
mod utils;
