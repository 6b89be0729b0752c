pub mod env_config;
pub mod error;
pub mod google;
pub mod http;
pub mod jwt;
pub mod mailer;
