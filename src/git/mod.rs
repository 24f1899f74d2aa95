pub mod ancestry;
pub mod repository;

pub use ancestry::AncestryOracle;
pub use repository::{Hunk, Repo};
