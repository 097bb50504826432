pub mod core;
pub mod isbn;
pub mod inventory;
pub mod lookup;
pub mod sources;
pub mod utils;
