mod geocode;
mod session;

pub use session::{ChatExchange, RecsSession};
