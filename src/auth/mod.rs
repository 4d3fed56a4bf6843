pub mod authenticate;
pub mod credentials;
pub mod token;
pub mod transport;
