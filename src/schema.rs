diesel::table! {
    blog_posts (id) {
        id -> Integer,
        author_id -> Integer,
        title -> Text,
        subtitle -> Text,
        date -> Text,
        body -> Text,
        img_url -> Text,
    }
}

diesel::table! {
    comments (id) {
        id -> Integer,
        author_id -> Integer,
        post_id -> Integer,
        text -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        email -> Text,
        password -> Text,
        name -> Text,
    }
}

diesel::joinable!(blog_posts -> users (author_id));
diesel::joinable!(comments -> blog_posts (post_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(
    blog_posts,
    comments,
    users,
);
