//! Display drivers

pub mod ls013b7dh05;

pub use ls013b7dh05::KywyDisplay;
