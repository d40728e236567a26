//! Application services behind the frontend pages

mod catalog;
mod listings;
mod profiles;
mod publication;
mod reviews;

pub use catalog::*;
pub use listings::*;
pub use profiles::*;
pub use publication::*;
pub use reviews::*;
