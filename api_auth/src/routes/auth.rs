use actix_web::{Responder, post, web};
use common::error::Res;
use common::http::{MessageResponse, Success};

use crate::dtos::auth::{GoogleAuthRequest, LoginRequest, SendOtpRequest, VerifyOtpRequest};
use crate::services::auth::{AuthService, MSG_OTP_SENT};

/// Starts an email signup by mailing a one-time code.
///
/// # Input
/// - `req`: JSON payload with `email` and `name`
///
/// # Output
/// - Success: `{ message }`
/// - Error: 400 when a field is missing or an account already owns the email,
///   500 when the code could not be mailed
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/send-otp', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ email: 'user@example.com', name: 'Ada' })
/// });
/// ```
#[post("/send-otp")]
pub async fn post_send_otp(
    req: web::Json<SendOtpRequest>,
    auth: web::Data<AuthService>,
) -> Res<impl Responder> {
    auth.request_signup_otp(req.into_inner()).await?;
    Success::ok(MessageResponse::new(MSG_OTP_SENT))
}

/// Completes a signup with the mailed code and the chosen password.
///
/// # Input
/// - `req`: JSON payload with `email`, `otp` and `password`
///
/// # Output
/// - Success: `{ message, token, user }`
/// - Error: 400 `Invalid or expired OTP` for any code mismatch
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/verify-otp', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ email: 'user@example.com', otp: '123456', password: 'secret' })
/// });
///
/// if (response.ok) {
///   const { token, user } = await response.json();
///   localStorage.setItem('token', token);
///   localStorage.setItem('user', JSON.stringify(user));
/// }
/// ```
#[post("/verify-otp")]
pub async fn post_verify_otp(
    req: web::Json<VerifyOtpRequest>,
    auth: web::Data<AuthService>,
) -> Res<impl Responder> {
    let response = auth.verify_otp(req.into_inner()).await?;
    Success::ok(response)
}

/// Authenticates an active user with email and password.
///
/// # Output
/// - Success: `{ message, token, user }`
/// - Error: 400 `Invalid credentials`, whether the email or the password is wrong
#[post("/login")]
pub async fn post_login(
    req: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Res<impl Responder> {
    let response = auth.login(req.into_inner()).await?;
    Success::ok(response)
}

/// Signs in with a Google ID token obtained by the client.
///
/// # Input
/// - `req`: JSON payload with `credential`
///
/// # Output
/// - Success: `{ message, token, user }`, creating or linking the account
/// - Error: 400 `Invalid Google token`
///
/// # Frontend Example
/// ```javascript
/// // inside the Google Identity Services callback
/// const response = await fetch('/api/auth/google', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ credential: googleResponse.credential })
/// });
/// ```
#[post("/google")]
pub async fn post_google(
    req: web::Json<GoogleAuthRequest>,
    auth: web::Data<AuthService>,
) -> Res<impl Responder> {
    let response = auth.google_auth(req.into_inner()).await?;
    Success::ok(response)
}

/// Development only. Stores a pending signup and returns its code.
#[post("/test-otp")]
pub async fn post_test_otp(
    req: web::Json<SendOtpRequest>,
    auth: web::Data<AuthService>,
) -> Res<impl Responder> {
    let response = auth.issue_test_otp(req.into_inner()).await?;
    Success::ok(response)
}
