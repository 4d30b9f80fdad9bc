pub mod server;
pub mod session;

pub use server::*;
pub use session::*;
