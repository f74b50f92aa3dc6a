pub mod donation_service;
pub mod stripe_service;
