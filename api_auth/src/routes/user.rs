use actix_web::{Responder, web};
use common::{error::Res, http::Success};
use db::models::user::User;

use crate::dtos::auth::{CurrentUserResponse, PublicUser};

/// Endpoint to retrieve the current authenticated user's information.
///
/// The user is resolved from the bearer token by `AuthMiddleware`, so this
/// handler only shapes the response.
///
/// # Output
/// - Success: `{ user: { id, name, email, isEmailVerified, avatar? } }`
/// - Error: 401 when the token is missing, invalid, expired or its user is gone
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/curruser', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('token')}` }
/// });
///
/// if (response.status === 401) {
///   localStorage.removeItem('token');
///   localStorage.removeItem('user');
///   window.location.href = '/login';
/// }
/// ```
pub async fn get_current_user(user: web::ReqData<User>) -> Res<impl Responder> {
    Success::ok(CurrentUserResponse {
        user: PublicUser::from(&*user),
    })
}
