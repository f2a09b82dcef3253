pub mod error;
pub mod info_display;
pub mod logger;
pub mod writer;
