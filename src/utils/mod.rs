pub mod confirmation;
pub mod geo;
pub mod pricing;
pub mod receipt;
pub mod slots;
