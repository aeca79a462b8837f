//! Request guard for routes that need a signed-in user.
//!
//! ```rust,ignore
//! use rocket::get;
//! use gearguard_api::session_guards::AuthenticatedUser;
//!
//! #[get("/whoami")]
//! fn whoami(user: AuthenticatedUser) -> String {
//!     format!("Signed in as {}", user.session.name())
//! }
//! ```

use chrono::Utc;
use rocket::State;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::backend::Backend;
use crate::session::{Session, SessionRegistry};
use crate::store::Bearer;

/// The caller's open session.
///
/// Resolution reads the `session` cookie and looks the id up in the
/// [`SessionRegistry`]. Sessions whose access token has expired are
/// renewed through [`SessionRegistry::refresh`], so parallel requests of
/// one session share a single renewal; if it fails the session is closed
/// and the request is answered with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub session: Session,
}

impl AuthenticatedUser {
    pub fn bearer(&self) -> Bearer {
        self.session.bearer()
    }

    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let registry = match request.guard::<&State<SessionRegistry>>().await {
            Outcome::Success(registry) => registry,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let session_id = match request.cookies().get("session") {
            Some(cookie) => cookie.value().to_string(),
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let session = match registry.get(&session_id).await {
            Some(session) => session,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        if !session.is_expired(Utc::now()) {
            return Outcome::Success(AuthenticatedUser { session });
        }

        let backend = match request.guard::<&Backend>().await {
            Outcome::Success(backend) => backend,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        match registry.refresh(&session_id, backend.auth.as_ref()).await {
            Ok(session) => Outcome::Success(AuthenticatedUser { session }),
            Err(e) => {
                warn!("Closed session for {}: refresh failed: {}", session.email, e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}
