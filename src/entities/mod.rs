pub mod medicine;
pub mod package;
pub mod pediatric;

pub use medicine::Medicine;
pub use package::PackageRecord;
