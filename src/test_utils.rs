use actix_http::Request;
use actix_web::{
    body::MessageBody,
    cookie::{Cookie, Key},
    dev::{Service, ServiceResponse},
    http::header,
    test,
    web::Data,
    App,
};
use tempfile::TempDir;

use crate::{
    app::AppState,
    auth::session::{self, SESSION_COOKIE},
    database::models::post::PostContent,
    routes,
};

/// App state backed by a fresh SQLite file that lives as long as the value.
pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.db");
        let state = AppState::new(path.to_str().unwrap()).unwrap();

        TestApp { state, _dir: dir }
    }
}

pub fn sample_content(title: &str) -> PostContent<'_> {
    PostContent {
        title,
        subtitle: "Subtitle",
        body: "<p>Body</p>",
        img_url: "https://example.com/cover.png",
    }
}

pub fn session_key() -> Key {
    Key::from(sha256::digest("test secret").as_bytes())
}

pub async fn init_app(
    state: &AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(Data::new(state.clone()))
            .wrap(session::middleware(session_key(), false))
            .configure(routes::configure),
    )
    .await
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<&str> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Registers an account and returns the cookie of the session it starts.
pub async fn register<S, B>(app: &S, email: &str, password: &str, name: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_form([("email", email), ("password", password), ("name", name)])
        .to_request();
    let resp = test::call_service(app, req).await;

    assert_eq!(location(&resp), Some("/"));
    session_cookie(&resp).unwrap()
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("email", email), ("password", password)])
        .to_request();

    test::call_service(app, req).await
}
