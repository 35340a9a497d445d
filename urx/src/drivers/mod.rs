#[cfg(feature="driver")]
mod driver;
#[cfg(feature="driver")]
pub use driver::*;

mod robot;
pub use robot::*;

mod driver_config;
pub use driver_config::*;
