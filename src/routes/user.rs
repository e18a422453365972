use actix_session::Session;
use actix_web::{
    get, post,
    web::{Data, Form},
    HttpResponse,
};
use log::info;

use super::{redirect, render, render_invalid};
use crate::{
    app::{AppError, AppState},
    auth::{
        password::{hash_password, verify_password},
        session, CurrentUser,
    },
    database::models::user::User,
    forms::{self, LoginForm, RegisterForm},
    views::{FormPage, Viewer},
};

const ALREADY_REGISTERED: &str = "You Have Already Signed Up with this email! Log In!";
const UNKNOWN_EMAIL: &str = "That Email does not Exist!";
const WRONG_PASSWORD: &str = "Wrong Password, Try Again!";

/// Pipe for the registration page
/// - url: `{domain}/register`
///
/// # Response
/// ## Ok
/// - page contract with an empty `form` posting to `/register`
#[get("/register")]
pub async fn register_form(current_user: CurrentUser, session: Session) -> HttpResponse {
    let page = FormPage::new(
        Viewer::new(&current_user, &session),
        RegisterForm::default(),
        "/register",
    );

    render(&page)
}

/// Pipe for creating an account
/// - url: `{domain}/register`
///
/// # HTTP request requirements
/// ## body
/// - form encoded `email`, `password` and `name`
///
/// # Example
/// ```
/// let request = actix_web::test::TestRequest::post()
///     .uri("/register")
///     .set_form([("email", "reader@example.com"), ("password", "hunter22"), ("name", "Reader")])
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - `303` to `/` with a logged in session cookie
/// - `303` to `/login` with a flash message if the email is taken
/// ## Error
/// - `422` with the form and its `errors` if validation fails
/// - Internal server error
#[post("/register")]
pub async fn register(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    form: Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner().normalized();
    if let Err(errors) = forms::check(&form) {
        let page = FormPage::new(Viewer::new(&current_user, &session), form, "/register")
            .with_errors(errors);
        return Ok(render_invalid(&page));
    }

    let RegisterForm {
        email,
        password,
        name,
    } = form;
    let created = app_state
        .db(move |conn| {
            if User::find_by_email(conn, &email)?.is_some() {
                return Ok(None);
            }
            let password_hash = hash_password(&password)?;

            //Still None if a concurrent registration won the race for the email
            User::new(conn, &email, &password_hash, &name)
        })
        .await?;

    match created {
        Some(user) => {
            info!("registered user {}", user.id);
            session::login(&session, user.id)?;
            Ok(redirect("/"))
        }
        None => {
            session::flash(&session, ALREADY_REGISTERED)?;
            Ok(redirect("/login"))
        }
    }
}

/// Pipe for the login page
/// - url: `{domain}/login`
#[get("/login")]
pub async fn login_form(current_user: CurrentUser, session: Session) -> HttpResponse {
    let page = FormPage::new(
        Viewer::new(&current_user, &session),
        LoginForm::default(),
        "/login",
    );

    render(&page)
}

/// Pipe for logging in
/// - url: `{domain}/login`
///
/// # HTTP request requirements
/// ## body
/// - form encoded `email` and `password`
///
/// # Response
/// ## Ok
/// - `303` to `/` with a logged in session cookie
/// - `303` back to `/login` with a flash message on an unknown email or a wrong password
/// ## Error
/// - `422` with the form and its `errors` if validation fails
/// - Internal server error
#[post("/login")]
pub async fn login(
    current_user: CurrentUser,
    session: Session,
    app_state: Data<AppState>,
    form: Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner().normalized();
    if let Err(errors) = forms::check(&form) {
        let page =
            FormPage::new(Viewer::new(&current_user, &session), form, "/login").with_errors(errors);
        return Ok(render_invalid(&page));
    }

    let LoginForm { email, password } = form;
    let attempt = app_state
        .db(move |conn| {
            let user = User::find_by_email(conn, &email)?;
            Ok(user.map(|user| {
                let verified = verify_password(&password, &user.password);
                (user, verified)
            }))
        })
        .await?;

    match attempt {
        None => {
            info!("login attempt for an unknown email");
            session::flash(&session, UNKNOWN_EMAIL)?;
            Ok(redirect("/login"))
        }
        Some((user, false)) => {
            info!("wrong password for user {}", user.id);
            session::flash(&session, WRONG_PASSWORD)?;
            Ok(redirect("/login"))
        }
        Some((user, true)) => {
            info!("user {} logged in", user.id);
            session::login(&session, user.id)?;
            Ok(redirect("/"))
        }
    }
}

/// Pipe for logging out, clears the whole session
/// - url: `{domain}/logout`
#[get("/logout")]
pub async fn logout(session: Session) -> HttpResponse {
    session::logout(&session);

    redirect("/")
}
