use actix_session::Session;
use actix_web::{get, HttpResponse};

use super::render;
use crate::{
    auth::CurrentUser,
    views::{StaticPage, Viewer},
};

/// Pipe for the about page
/// - url: `{domain}/about`
#[get("/about")]
pub async fn about(current_user: CurrentUser, session: Session) -> HttpResponse {
    render(&StaticPage {
        viewer: Viewer::new(&current_user, &session),
        page: "about",
    })
}

/// Pipe for the contact page
/// - url: `{domain}/contact`
#[get("/contact")]
pub async fn contact(current_user: CurrentUser, session: Session) -> HttpResponse {
    render(&StaticPage {
        viewer: Viewer::new(&current_user, &session),
        page: "contact",
    })
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::test_utils::{self, init_app, TestApp};

    #[actix_rt::test]
    async fn test_static_pages_carry_the_viewer() {
        let test_app = TestApp::new();
        let app = init_app(&test_app.state).await;

        let req = test::TestRequest::get().uri("/about").to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(
            page,
            json!({
                "logged_in": false,
                "is_admin": false,
                "user": null,
                "flashes": [],
                "page": "about",
            })
        );

        let cookie = test_utils::register(&app, "reader@example.com", "hunter22", "Reader").await;
        let req = test::TestRequest::get()
            .uri("/contact")
            .cookie(cookie)
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        pretty_assertions::assert_eq!(page["page"], "contact");
        pretty_assertions::assert_eq!(page["user"], json!({ "id": 1, "name": "Reader" }));
    }
}
