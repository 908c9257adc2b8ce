//! Middleware layers.

pub(crate) mod redirect;
pub(crate) mod security;
