//! Admin authentication: token codec and request guard

mod gate;
mod token;

pub use gate::{authorize, clear_session, extract_token, session_cookie, AdminUser, ADMIN_COOKIE};
pub use token::{InvalidToken, TokenClaims, TokenCodec, ADMIN_ROLE, TOKEN_LIFETIME_HOURS};
