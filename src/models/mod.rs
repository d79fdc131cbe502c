pub mod aggregation;
pub mod filter;
pub mod record;
pub mod response;
pub mod result;

pub use aggregation::*;
pub use filter::*;
pub use record::*;
pub use response::*;
pub use result::*;
