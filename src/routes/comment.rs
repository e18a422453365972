use actix_session::Session;
use actix_web::{
    post,
    web::{Data, Form, Path},
    HttpResponse,
};
use log::info;

use super::{redirect, render_invalid};
use crate::{
    app::{AppError, AppState},
    auth::{session, CurrentUser},
    database::models::{comment::Comment, post::BlogPost},
    forms::{self, CommentForm},
    views::{PostPage, Viewer},
};

const LOGIN_TO_COMMENT: &str = "You need to login or register!";

/// Pipe for commenting on a post
/// - url: `{domain}/post/{post_id}`
///
/// # HTTP request requirements
/// ## header
/// - session cookie of a logged in user
/// ## body
/// - form encoded `body`
///
/// # Example
/// ```
/// let request = actix_web::test::TestRequest::post()
///     .uri("/post/1")
///     .cookie(session_cookie)
///     .set_form([("body", "Nice post!")])
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - `303` to `/` once the comment is stored
/// - `303` to `/login` with a flash message when nobody is logged in
/// ## Error
/// - `422` with the post page and its `errors` if the comment is empty
/// - Not found
/// - Internal server error
#[post("/post/{post_id}")]
pub async fn add_comment(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    post_id: Path<i32>,
    form: Form<CommentForm>,
) -> Result<HttpResponse, AppError> {
    let author_id = match &current_user.0 {
        Some(user) => user.id,
        None => {
            session::flash(&session, LOGIN_TO_COMMENT)?;
            return Ok(redirect("/login"));
        }
    };

    let post_id = post_id.into_inner();
    let form = form.into_inner().normalized();
    if let Err(errors) = forms::check(&form) {
        let thread = app_state
            .db(move |conn| BlogPost::load_thread(conn, post_id))
            .await?;

        let page = PostPage::new(Viewer::new(&current_user, &session), thread, form, errors);
        return Ok(render_invalid(&page));
    }

    let comment = app_state
        .db(move |conn| {
            BlogPost::find_by_id(conn, post_id)?;
            Comment::new(conn, post_id, author_id, &form.body)
        })
        .await?;

    info!("user {author_id} commented on post {post_id} ({})", comment.id);
    Ok(redirect("/"))
}
