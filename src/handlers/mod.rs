pub mod control;
pub mod home;
pub mod services;
