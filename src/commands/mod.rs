pub mod convert;
pub mod serve;

pub use convert::handle_convert;
pub use serve::handle_serve;
