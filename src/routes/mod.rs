pub mod donations;
pub mod health;
pub mod players;
pub mod webhooks;
