pub mod profile;
pub mod ws;
