//! Sign-in, sign-out and sign-up flows shared by the service routes.

pub mod login;
pub mod logout;
pub mod signup;

pub use login::{LoginRequest, process_login, set_session_cookie};
pub use logout::process_logout;
pub use signup::{SignupError, SignupOutcome, SignupRequest, process_signup};
