use diesel::prelude::*;

use super::{comment::Comment, user::User};
use crate::{
    app::AppError,
    database::db_utils::DbConnection,
    schema::{blog_posts, users},
};

/// Display format of [BlogPost::date], e.g. `October 19, 2026`
pub const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = blog_posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BlogPost {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
}

/// The fields an admin may write when creating or editing a post.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = blog_posts)]
pub struct PostContent<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub body: &'a str,
    pub img_url: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = blog_posts)]
struct BlogPostInsert<'a> {
    author_id: i32,
    date: &'a str,
    #[diesel(embed)]
    content: PostContent<'a>,
}

/// A post together with its author and its comments (oldest first).
#[derive(Debug)]
pub struct PostThread {
    pub post: BlogPost,
    pub author: User,
    pub comments: Vec<(Comment, User)>,
}

impl BlogPost {
    pub fn new(
        conn: &mut DbConnection,
        author: &User,
        content: PostContent<'_>,
        date: &str,
    ) -> Result<BlogPost, AppError> {
        let to_insert = BlogPostInsert {
            author_id: author.id,
            date,
            content,
        };

        let post = diesel::insert_into(blog_posts::table)
            .values(&to_insert)
            .returning(BlogPost::as_returning())
            .get_result(conn)?;

        Ok(post)
    }

    /** Returns every post in storage order with the name of its author */
    pub fn all_with_authors(conn: &mut DbConnection) -> Result<Vec<(BlogPost, User)>, AppError> {
        let posts = blog_posts::table
            .inner_join(users::table)
            .order(blog_posts::id.asc())
            .select((BlogPost::as_select(), User::as_select()))
            .load(conn)?;

        Ok(posts)
    }

    /// Returns the post with `post_id` or [AppError::NotFound].
    pub fn find_by_id(conn: &mut DbConnection, post_id: i32) -> Result<BlogPost, AppError> {
        let post = blog_posts::table
            .find(post_id)
            .select(BlogPost::as_select())
            .first(conn)?;

        Ok(post)
    }

    /// Loads everything the detail page shows for `post_id`.
    pub fn load_thread(conn: &mut DbConnection, post_id: i32) -> Result<PostThread, AppError> {
        let (post, author) = blog_posts::table
            .inner_join(users::table)
            .filter(blog_posts::id.eq(post_id))
            .select((BlogPost::as_select(), User::as_select()))
            .first(conn)?;
        let comments = Comment::find_by_post_with_authors(conn, post.id)?;

        Ok(PostThread {
            post,
            author,
            comments,
        })
    }

    /// Overwrites every editable field; author and date stay as they were.
    pub fn edit(&mut self, conn: &mut DbConnection, content: PostContent<'_>) -> Result<(), AppError> {
        *self = diesel::update(blog_posts::table.find(self.id))
            .set(&content)
            .returning(BlogPost::as_returning())
            .get_result(conn)?;

        Ok(())
    }

    /** Deletes a post and its comments in one transaction.
     * Returns the number of comments removed, or [AppError::NotFound] if the post does not exist.
     */
    pub fn delete_by_id(conn: &mut DbConnection, post_id: i32) -> Result<usize, AppError> {
        conn.transaction::<_, AppError, _>(|conn| {
            let removed_comments = Comment::delete_by_post(conn, post_id)?;
            let removed = diesel::delete(blog_posts::table.find(post_id)).execute(conn)?;
            if removed == 0 {
                return Err(AppError::NotFound);
            }

            Ok(removed_comments)
        })
    }
}
