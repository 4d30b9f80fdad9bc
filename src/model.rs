pub mod route;
pub mod stop;
pub mod vehicle;

pub use route::*;
pub use stop::*;
pub use vehicle::*;
