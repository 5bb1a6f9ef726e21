pub mod health_handlers;
pub mod meetup_handlers;
