pub mod convert;
pub mod fetch;
pub mod sheet;
pub mod transform;
pub mod write;
