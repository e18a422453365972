pub mod comment;
pub mod pages;
pub mod post;
pub mod user;

use actix_web::{http::header, web, HttpResponse};
use serde::Serialize;

/// Registers every page of the site.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        //Post routes
        .service(post::get_all_posts)
        .service(post::show_post)
        .service(post::new_post_form)
        .service(post::create_post)
        .service(post::edit_post_form)
        .service(post::update_post)
        .service(post::delete_post)
        //Comment routes
        .service(comment::add_comment)
        //User routes
        .service(user::register_form)
        .service(user::register)
        .service(user::login_form)
        .service(user::login)
        .service(user::logout)
        //Static pages
        .service(pages::about)
        .service(pages::contact);
}

/// `303 See Other` pointing at `location`
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn render<T: Serialize>(page: &T) -> HttpResponse {
    HttpResponse::Ok().json(page)
}

/// Re-renders a page whose form did not validate.
pub(crate) fn render_invalid<T: Serialize>(page: &T) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(page)
}
