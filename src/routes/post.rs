use actix_session::Session;
use actix_web::{
    get,
    middleware::from_fn,
    post,
    web::{Data, Form, Path},
    HttpResponse,
};
use chrono::Local;
use log::info;

use super::{redirect, render, render_invalid};
use crate::{
    app::{AppError, AppState},
    auth::{admin_only, CurrentUser},
    database::models::post::{BlogPost, DATE_FORMAT},
    forms::{self, CommentForm, FormErrors, PostForm},
    views::{FormPage, IndexPage, PostPage, PostSummary, Viewer},
};

/// Pipe for the front page, listing every post
/// - url: `{domain}/`
///
/// # Example
/// ```
/// let request = actix_web::test::TestRequest::get()
///     .uri("/")
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// ```
/// {
///     "logged_in": false,
///     "is_admin": false,
///     "user": null,
///     "flashes": [],
///     "all_posts": [
///         {
///             "id": 1,
///             "title": "Post title",
///             "subtitle": "Post subtitle",
///             "date": "October 19, 2026",
///             "img_url": "https://example.com/cover.png",
///             "author": "Admin"
///         }
///     ]
/// }
/// ```
/// ## Error
/// - Internal server error
#[get("/")]
pub async fn get_all_posts(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let posts = app_state.db(BlogPost::all_with_authors).await?;

    let page = IndexPage {
        viewer: Viewer::new(&current_user, &session),
        all_posts: posts
            .into_iter()
            .map(|(post, author)| PostSummary::new(post, &author))
            .collect(),
    };

    Ok(render(&page))
}

/// Pipe for a single post with its comments
/// - url: `{domain}/post/{post_id}`
///
/// # Response
/// ## Ok
/// - page contract with `post`, `comments`, an empty `comment_form` and `errors`
/// ## Error
/// - Not found
/// - Internal server error
#[get("/post/{post_id}")]
pub async fn show_post(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    post_id: Path<i32>,
) -> Result<HttpResponse, AppError> {
    let post_id = post_id.into_inner();
    let thread = app_state
        .db(move |conn| BlogPost::load_thread(conn, post_id))
        .await?;

    let page = PostPage::new(
        Viewer::new(&current_user, &session),
        thread,
        CommentForm::default(),
        FormErrors::new(),
    );

    Ok(render(&page))
}

/// Pipe for the empty make-post page, admin only
/// - url: `{domain}/new-post`
#[get("/new-post", wrap = "from_fn(admin_only)")]
pub async fn new_post_form(current_user: CurrentUser, session: Session) -> HttpResponse {
    let page = FormPage::new(
        Viewer::new(&current_user, &session),
        PostForm::default(),
        "/new-post",
    );

    render(&page)
}

/// Pipe for creating a post, admin only
/// - url: `{domain}/new-post`
///
/// # HTTP request requirements
/// ## header
/// - session cookie of the admin
/// ## body
/// - form encoded `title`, `subtitle`, `img_url` and `body`
///
/// # Response
/// ## Ok
/// - `303` to `/`
/// ## Error
/// - `422` with the form and its `errors` if validation fails
/// - Forbidden
/// - Internal server error
#[post("/new-post", wrap = "from_fn(admin_only)")]
pub async fn create_post(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    form: Form<PostForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner().normalized();
    if let Err(errors) = forms::check(&form) {
        let page = FormPage::new(Viewer::new(&current_user, &session), form, "/new-post")
            .with_errors(errors);
        return Ok(render_invalid(&page));
    }

    let author = current_user.0.ok_or(AppError::Forbidden)?;
    let date = Local::now().format(DATE_FORMAT).to_string();
    let post = app_state
        .db(move |conn| BlogPost::new(conn, &author, form.content(), &date))
        .await?;

    info!("created post {} \"{}\"", post.id, post.title);
    Ok(redirect("/"))
}

/// Pipe for the edit page of a post, pre-populated with its current content, admin only
/// - url: `{domain}/edit-post/{post_id}`
///
/// # Response
/// ## Ok
/// - page contract with `form` holding the post and `action` set to this url
/// ## Error
/// - Forbidden
/// - Not found
#[get("/edit-post/{post_id}", wrap = "from_fn(admin_only)")]
pub async fn edit_post_form(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    post_id: Path<i32>,
) -> Result<HttpResponse, AppError> {
    let post_id = post_id.into_inner();
    let post = app_state
        .db(move |conn| BlogPost::find_by_id(conn, post_id))
        .await?;

    let page = FormPage::new(
        Viewer::new(&current_user, &session),
        PostForm::from(&post),
        format!("/edit-post/{post_id}"),
    );

    Ok(render(&page))
}

/// Pipe for overwriting a post, admin only. Author and date are kept.
/// - url: `{domain}/edit-post/{post_id}`
///
/// # HTTP request requirements
/// ## header
/// - session cookie of the admin
/// ## body
/// - form encoded `title`, `subtitle`, `img_url` and `body`
///
/// # Response
/// ## Ok
/// - `303` to `/post/{post_id}`
/// ## Error
/// - `422` with the form and its `errors` if validation fails
/// - Forbidden
/// - Not found
/// - Internal server error
#[post("/edit-post/{post_id}", wrap = "from_fn(admin_only)")]
pub async fn update_post(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    post_id: Path<i32>,
    form: Form<PostForm>,
) -> Result<HttpResponse, AppError> {
    let post_id = post_id.into_inner();
    let form = form.into_inner().normalized();

    if let Err(errors) = forms::check(&form) {
        app_state
            .db(move |conn| BlogPost::find_by_id(conn, post_id))
            .await?;

        let page = FormPage::new(
            Viewer::new(&current_user, &session),
            form,
            format!("/edit-post/{post_id}"),
        )
        .with_errors(errors);
        return Ok(render_invalid(&page));
    }

    let post = app_state
        .db(move |conn| {
            let mut post = BlogPost::find_by_id(conn, post_id)?;
            post.edit(conn, form.content())?;
            Ok(post)
        })
        .await?;

    info!("edited post {} \"{}\"", post.id, post.title);
    Ok(redirect(&format!("/post/{}", post.id)))
}

/// Pipe for deleting a post together with its comments, admin only
/// - url: `{domain}/delete/{post_id}`
///
/// # Response
/// ## Ok
/// - `303` to `/`
/// ## Error
/// - Forbidden
/// - Not found
/// - Internal server error
#[get("/delete/{post_id}", wrap = "from_fn(admin_only)")]
pub async fn delete_post(
    app_state: Data<AppState>,
    post_id: Path<i32>,
) -> Result<HttpResponse, AppError> {
    let post_id = post_id.into_inner();
    let removed_comments = app_state
        .db(move |conn| BlogPost::delete_by_id(conn, post_id))
        .await?;

    info!("deleted post {post_id} and {removed_comments} comment(s)");
    Ok(redirect("/"))
}

#[cfg(test)]
mod tests {
    use actix_http::Request;
    use actix_web::{
        body::MessageBody,
        cookie::Cookie,
        dev::{Service, ServiceResponse},
        http::StatusCode,
        test,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        database::models::{comment::Comment, user::User},
        test_utils::{self, init_app, location, TestApp},
    };

    const COVER: &str = "https://example.com/cover.png";

    async fn submit_post<S, B>(
        app: &S,
        cookie: Option<&Cookie<'static>>,
        uri: &str,
        title: &str,
    ) -> ServiceResponse<B>
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        let mut req = test::TestRequest::post().uri(uri).set_form([
            ("title", title),
            ("subtitle", "A subtitle"),
            ("img_url", COVER),
            ("body", "<p>Hello</p>"),
        ]);
        if let Some(cookie) = cookie {
            req = req.cookie(cookie.clone());
        }

        test::call_service(app, req.to_request()).await
    }

    async fn listing<S, B>(app: &S) -> Value
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        test::call_and_read_body_json(app, test::TestRequest::get().uri("/").to_request()).await
    }

    #[actix_rt::test]
    async fn test_admin_routes_are_forbidden_to_everyone_else() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;
        let reader = test_utils::register(&app, "reader@example.com", "hunter22", "Reader").await;
        let resp = submit_post(&app, Some(&admin), "/new-post", "Existing").await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        for cookie in [None, Some(&reader)] {
            for uri in ["/new-post", "/edit-post/1", "/delete/1"] {
                let mut req = test::TestRequest::get().uri(uri);
                if let Some(cookie) = cookie {
                    req = req.cookie(cookie.clone());
                }
                let resp = test::call_service(&app, req.to_request()).await;
                pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN, "GET {uri}");
            }

            let resp = submit_post(&app, cookie, "/new-post", "Sneaky").await;
            pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN);
            let resp = submit_post(&app, cookie, "/edit-post/1", "Defaced").await;
            pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }

        let page = listing(&app).await;
        pretty_assertions::assert_eq!(page["all_posts"].as_array().unwrap().len(), 1);
        pretty_assertions::assert_eq!(page["all_posts"][0]["title"], "Existing");
    }

    #[actix_rt::test]
    async fn test_admin_session_of_a_deleted_account_is_forbidden() {
        use diesel::prelude::*;

        use crate::schema::users;

        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;
        test_utils::register(&app, "reader@example.com", "hunter22", "Reader").await;
        {
            let mut conn = test_app.state.pool.get().unwrap();
            let reader = User::find_by_id(&mut conn, 2).unwrap().unwrap();
            BlogPost::new(&mut conn, &reader, test_utils::sample_content("Kept"), "May 01, 2024")
                .unwrap();
            diesel::delete(users::table.find(1))
                .execute(&mut *conn)
                .unwrap();
        }

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(admin.clone())
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(page["logged_in"], false);
        pretty_assertions::assert_eq!(page["is_admin"], false);

        for uri in ["/delete/1", "/edit-post/1", "/new-post"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .cookie(admin.clone())
                .to_request();
            let resp = test::call_service(&app, req).await;
            pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN, "GET {uri}");
        }

        let resp = submit_post(&app, Some(&admin), "/edit-post/1", "Defaced").await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let mut conn = test_app.state.pool.get().unwrap();
        pretty_assertions::assert_eq!(BlogPost::find_by_id(&mut conn, 1).unwrap().title, "Kept");
    }

    #[actix_rt::test]
    async fn test_created_post_is_listed_once() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;

        let req = test::TestRequest::get()
            .uri("/new-post")
            .cookie(admin.clone())
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(page["action"], "/new-post");
        pretty_assertions::assert_eq!(page["form"]["title"], "");

        let resp = submit_post(&app, Some(&admin), "/new-post", "  Hello world ").await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        pretty_assertions::assert_eq!(location(&resp), Some("/"));

        let page = listing(&app).await;
        let today = Local::now().format(DATE_FORMAT).to_string();
        pretty_assertions::assert_eq!(
            page["all_posts"],
            json!([{
                "id": 1,
                "title": "Hello world",
                "subtitle": "A subtitle",
                "date": today,
                "img_url": COVER,
                "author": "Admin",
            }])
        );
    }

    #[actix_rt::test]
    async fn test_invalid_post_is_rerendered() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;

        let req = test::TestRequest::post()
            .uri("/new-post")
            .cookie(admin)
            .set_form([("title", "Title"), ("img_url", "cover.png")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let page: Value = test::read_body_json(resp).await;
        pretty_assertions::assert_eq!(page["form"]["title"], "Title");
        pretty_assertions::assert_eq!(
            page["errors"].as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["body", "img_url", "subtitle"]
        );

        let page = listing(&app).await;
        pretty_assertions::assert_eq!(page["all_posts"], json!([]));
    }

    #[actix_rt::test]
    async fn test_show_post() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;
        submit_post(&app, Some(&admin), "/new-post", "Readable").await;

        let req = test::TestRequest::get().uri("/post/1").to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(page["post"]["title"], "Readable");
        pretty_assertions::assert_eq!(page["post"]["body"], "<p>Hello</p>");
        pretty_assertions::assert_eq!(page["post"]["author"], "Admin");
        pretty_assertions::assert_eq!(page["comments"], json!([]));
        pretty_assertions::assert_eq!(page["comment_form"], json!({ "body": "" }));
        pretty_assertions::assert_eq!(page["logged_in"], false);

        for uri in ["/post/2", "/post/abc"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {uri}");
        }
    }

    #[actix_rt::test]
    async fn test_edit_overwrites_content_and_keeps_the_date() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;

        {
            let mut conn = test_app.state.pool.get().unwrap();
            let author = User::find_by_id(&mut conn, 1).unwrap().unwrap();
            BlogPost::new(&mut conn, &author, test_utils::sample_content("Draft"), "May 01, 2024")
                .unwrap();
        }

        let req = test::TestRequest::get()
            .uri("/edit-post/1")
            .cookie(admin.clone())
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(page["action"], "/edit-post/1");
        pretty_assertions::assert_eq!(page["form"]["title"], "Draft");
        pretty_assertions::assert_eq!(page["form"]["body"], "<p>Body</p>");

        let resp = submit_post(&app, Some(&admin), "/edit-post/1", "Final").await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        pretty_assertions::assert_eq!(location(&resp), Some("/post/1"));

        let req = test::TestRequest::get().uri("/post/1").to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(page["post"]["title"], "Final");
        pretty_assertions::assert_eq!(page["post"]["subtitle"], "A subtitle");
        pretty_assertions::assert_eq!(page["post"]["body"], "<p>Hello</p>");
        pretty_assertions::assert_eq!(page["post"]["date"], "May 01, 2024");
        pretty_assertions::assert_eq!(page["post"]["author_id"], 1);
    }

    #[actix_rt::test]
    async fn test_edit_missing_post_is_not_found() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;

        let req = test::TestRequest::get()
            .uri("/edit-post/7")
            .cookie(admin.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = submit_post(&app, Some(&admin), "/edit-post/7", "Ghost").await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = submit_post(&app, Some(&admin), "/edit-post/7", "").await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_delete_removes_post_and_comments() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;
        let admin = test_utils::register(&app, "admin@example.com", "hunter22", "Admin").await;
        submit_post(&app, Some(&admin), "/new-post", "Doomed").await;
        submit_post(&app, Some(&admin), "/new-post", "Survivor").await;
        {
            let mut conn = test_app.state.pool.get().unwrap();
            Comment::new(&mut conn, 1, 1, "First!").unwrap();
            Comment::new(&mut conn, 2, 1, "Still here").unwrap();
        }

        let req = test::TestRequest::get()
            .uri("/delete/1")
            .cookie(admin.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        pretty_assertions::assert_eq!(location(&resp), Some("/"));

        let page = listing(&app).await;
        let titles: Vec<_> = page["all_posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|post| post["title"].clone())
            .collect();
        pretty_assertions::assert_eq!(titles, vec![json!("Survivor")]);

        let req = test::TestRequest::get().uri("/post/1").to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let mut conn = test_app.state.pool.get().unwrap();
        pretty_assertions::assert_eq!(Comment::count_by_post(&mut conn, 1).unwrap(), 0);
        pretty_assertions::assert_eq!(Comment::count_by_post(&mut conn, 2).unwrap(), 1);
        drop(conn);

        let req = test::TestRequest::get()
            .uri("/delete/1")
            .cookie(admin)
            .to_request();
        let resp = test::call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
