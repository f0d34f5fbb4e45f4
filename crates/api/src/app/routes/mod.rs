use crate::app::route_table::{RouteError, RouteTable};
use crate::app::state::AppState;
use crate::binder::Param;

pub mod blogs;
pub mod comments;
pub mod common;
pub mod pages;
pub mod system;
pub mod users;

/// Every route the blog serves.
pub fn table(body_limit: usize) -> Result<RouteTable<AppState>, RouteError> {
    let mut table = RouteTable::new().with_body_limit(body_limit);
    let page = || Param::optional("page");

    table
        .get("/health", "health", &[], system::health)?
        // pages
        .get("/", "index", &[Param::request(), page()], pages::index)?
        .get("/register", "register", &[Param::request()], pages::register)?
        .get("/signin", "signin", &[Param::request()], pages::signin)?
        .get("/signout", "signout", &[Param::request()], users::signout)?
        .get(
            "/blog/{id}",
            "blog_detail",
            &[Param::path("id"), Param::request()],
            pages::blog_detail,
        )?
        .get("/show_all_users", "show_all_users", &[Param::request()], pages::show_all_users)?
        .get("/manage/", "manage", &[], pages::manage)?
        .get(
            "/manage/comments",
            "manage_comments",
            &[Param::request(), page()],
            pages::manage_comments,
        )?
        .get(
            "/manage/blogs",
            "manage_blogs",
            &[Param::request(), page()],
            pages::manage_blogs,
        )?
        .get(
            "/manage/blogs/create",
            "manage_create_blog",
            &[Param::request()],
            pages::manage_create_blog,
        )?
        .get(
            "/manage/blogs/modify/{id}",
            "manage_modify_blog",
            &[Param::path("id"), Param::request()],
            pages::manage_modify_blog,
        )?
        .get(
            "/manage/users",
            "manage_users",
            &[Param::request(), page()],
            pages::manage_users,
        )?
        // users
        .post(
            "/api/users",
            "api_register_user",
            &[Param::keyword("email"), Param::keyword("name"), Param::keyword("passwd")],
            users::api_register_user,
        )?
        .get("/api/users", "api_get_users", &[page()], users::api_get_users)?
        .post(
            "/api/authenticate",
            "authenticate",
            &[Param::keyword("email"), Param::keyword("passwd")],
            users::authenticate,
        )?
        // blogs
        .get("/api/blogs", "api_blogs", &[page()], blogs::api_blogs)?
        .get("/api/blogs/{id}", "api_get_blog", &[Param::keyword("id")], blogs::api_get_blog)?
        .post(
            "/api/blogs",
            "api_create_blog",
            &[
                Param::request(),
                Param::keyword("name"),
                Param::keyword("summary"),
                Param::keyword("content"),
            ],
            blogs::api_create_blog,
        )?
        .post(
            "/api/blogs/modify",
            "api_modify_blog",
            &[
                Param::request(),
                Param::keyword("id"),
                Param::keyword("name"),
                Param::keyword("summary"),
                Param::keyword("content"),
            ],
            blogs::api_modify_blog,
        )?
        .post(
            "/api/blogs/delete/{id}",
            "api_delete_blog",
            &[Param::path("id"), Param::request()],
            blogs::api_delete_blog,
        )?
        // comments
        .get("/api/comments", "api_comments", &[page()], comments::api_comments)?
        .post(
            "/api/blogs/{id}/comments",
            "api_create_comment",
            &[Param::path("id"), Param::request(), Param::keyword("content")],
            comments::api_create_comment,
        )?
        .post(
            "/api/comments/delete/{id}",
            "api_delete_comment",
            &[Param::path("id"), Param::request()],
            comments::api_delete_comment,
        )?;

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blog_routes_register_cleanly() {
        let table = table(1024).unwrap();
        let routes: Vec<_> = table
            .routes()
            .iter()
            .map(|r| (r.method().as_str(), r.pattern(), r.handler().name()))
            .collect();

        assert!(routes.contains(&("GET", "/", "index")));
        assert!(routes.contains(&("POST", "/api/users", "api_register_user")));
        assert!(routes.contains(&("GET", "/api/users", "api_get_users")));
        assert!(routes.contains(&("POST", "/api/blogs/{id}/comments", "api_create_comment")));
        assert_eq!(routes.len(), 24);
    }
}
