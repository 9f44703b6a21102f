pub mod connection;
pub mod cursor;
pub mod registry;

pub use connection::*;
pub use cursor::*;
pub use registry::*;
