pub mod session;
pub mod settings;
pub mod system;
