use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

use crate::api::errors::Error;
use crate::backend::Backend;
use crate::client::session::{self, Gate, Session};

/// The raw session token from the `Authorization` header, if any.
pub struct Token(pub Option<String>);

/// Accepts both `Bearer <token>` and a bare token.
fn session_token(request: &rocket::Request<'_>) -> Option<String> {
    request.headers().get_one("Authorization").map(|value| {
        value
            .strip_prefix("Bearer ")
            .unwrap_or(value)
            .trim()
            .to_string()
    })
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Token {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(Token(session_token(request)))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = Error;

    async fn from_request(request: &'r rocket::Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(backend) = request.rocket().state::<Backend>() else {
            return Outcome::Error((
                Status::InternalServerError,
                Error::InternalServer("Missing backend".to_string()),
            ));
        };
        let token = session_token(request);
        match session::guard(backend, token.as_deref()).await {
            Gate::Allowed(session) => Outcome::Success(session),
            Gate::Redirect(_) => Outcome::Error((
                Status::Unauthorized,
                Error::Unauthorized("Missing session".to_string()),
            )),
        }
    }
}
