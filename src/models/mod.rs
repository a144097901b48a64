pub mod review;
pub mod diagnosis;
pub mod response;

pub use review::*;
pub use diagnosis::*;
pub use response::*;
