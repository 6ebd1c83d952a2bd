pub mod jwt;

pub use jwt::{decode_jwt, make_jwt};
