//! Page contexts. Each page is delivered as the JSON object of variables a
//! template would be rendered from.

use actix_session::Session;
use serde::Serialize;

use crate::{
    auth::{session, CurrentUser},
    database::models::{
        comment::Comment,
        post::{BlogPost, PostThread},
        user::User,
    },
    forms::{CommentForm, FormErrors},
};

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub name: String,
}

/// Who is looking at the page, and the flash messages waiting for them.
/// Building it drains the flash queue.
#[derive(Debug, Serialize)]
pub struct Viewer {
    pub logged_in: bool,
    pub is_admin: bool,
    pub user: Option<UserView>,
    pub flashes: Vec<String>,
}

impl Viewer {
    pub fn new(current_user: &CurrentUser, session: &Session) -> Self {
        Viewer {
            logged_in: current_user.is_authenticated(),
            is_admin: current_user.is_admin(),
            user: current_user.0.as_ref().map(|user| UserView {
                id: user.id,
                name: user.name.clone(),
            }),
            flashes: session::take_flashes(session),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub img_url: String,
    pub author: String,
}

impl PostSummary {
    pub fn new(post: BlogPost, author: &User) -> Self {
        PostSummary {
            id: post.id,
            title: post.title,
            subtitle: post.subtitle,
            date: post.date,
            img_url: post.img_url,
            author: author.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i32,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i32,
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub text: String,
    pub author_id: i32,
    pub author: String,
}

impl CommentView {
    fn new(comment: Comment, author: &User) -> Self {
        CommentView {
            id: comment.id,
            text: comment.text,
            author_id: author.id,
            author: author.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    #[serde(flatten)]
    pub viewer: Viewer,
    pub all_posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    #[serde(flatten)]
    pub viewer: Viewer,
    pub post: PostDetail,
    pub comments: Vec<CommentView>,
    pub comment_form: CommentForm,
    pub errors: FormErrors,
}

impl PostPage {
    pub fn new(viewer: Viewer, thread: PostThread, comment_form: CommentForm, errors: FormErrors) -> Self {
        let PostThread {
            post,
            author,
            comments,
        } = thread;

        PostPage {
            viewer,
            post: PostDetail {
                id: post.id,
                title: post.title,
                subtitle: post.subtitle,
                date: post.date,
                body: post.body,
                img_url: post.img_url,
                author_id: author.id,
                author: author.name,
            },
            comments: comments
                .into_iter()
                .map(|(comment, author)| CommentView::new(comment, &author))
                .collect(),
            comment_form,
            errors,
        }
    }
}

/// Register, login and make-post pages: the form, its errors and where it posts to.
#[derive(Debug, Serialize)]
pub struct FormPage<F: Serialize> {
    #[serde(flatten)]
    pub viewer: Viewer,
    pub form: F,
    pub errors: FormErrors,
    pub action: String,
}

impl<F: Serialize> FormPage<F> {
    pub fn new(viewer: Viewer, form: F, action: impl Into<String>) -> Self {
        FormPage {
            viewer,
            form,
            errors: FormErrors::new(),
            action: action.into(),
        }
    }

    pub fn with_errors(mut self, errors: FormErrors) -> Self {
        self.errors = errors;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct StaticPage {
    #[serde(flatten)]
    pub viewer: Viewer,
    pub page: &'static str,
}
