pub mod password;
pub mod session;

use actix_session::SessionExt;
use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{Payload, ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
    FromRequest, HttpRequest,
};
use futures::future::LocalBoxFuture;
use log::warn;

use crate::{
    app::{AppError, AppState},
    database::models::user::User,
};

/// The first registered account is the only administrator.
pub const ADMIN_USER_ID: i32 = 1;

/// Middleware guarding admin-only routes. Anyone whose session does not
/// belong to an existing [ADMIN_USER_ID] account gets `403 Forbidden` and the
/// route never runs.
///
/// # Example
/// ```
/// #[get("/new-post", wrap = "from_fn(admin_only)")]
/// pub async fn new_post_form() -> HttpResponse { ... }
/// ```
pub async fn admin_only<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
    let user_id = session::current_user_id(&req.get_session());
    let app_state = req.app_data::<Data<AppState>>().cloned();

    //The session alone is not enough, the account must still exist
    let admin = match (user_id, app_state) {
        (Some(ADMIN_USER_ID), Some(app_state)) => {
            app_state
                .db(|conn| User::find_by_id(conn, ADMIN_USER_ID))
                .await
        }
        _ => Ok(None),
    };

    match admin {
        Ok(Some(_)) => next.call(req).await.map(ServiceResponse::map_into_left_body),
        Ok(None) => {
            warn!(
                "forbidden {} {} for user {:?}",
                req.method(),
                req.path(),
                user_id
            );
            Ok(req.error_response(AppError::Forbidden).map_into_right_body())
        }
        Err(err) => Ok(req.error_response(err).map_into_right_body()),
    }
}

/// The user behind the request's session, if any.
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.0.as_ref().map_or(false, User::is_admin)
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user_id = session::current_user_id(&req.get_session());
        let app_state = req.app_data::<Data<AppState>>().cloned();

        Box::pin(async move {
            let user_id = match user_id {
                Some(user_id) => user_id,
                None => return Ok(CurrentUser(None)),
            };
            let app_state = app_state.ok_or(AppError::InternalServerError)?;

            //A session pointing at a vanished account is treated as anonymous
            let user = app_state
                .db(move |conn| User::find_by_id(conn, user_id))
                .await?;

            Ok(CurrentUser(user))
        })
    }
}
