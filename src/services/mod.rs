pub mod meetup_service;
