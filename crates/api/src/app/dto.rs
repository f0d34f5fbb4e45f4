//! JSON mapping for records sent to clients and templates.

use serde_json::{Value, json};

use myblog_core::{Blog, Comment, Page, User, text_to_html, user::MASKED_PASSWORD};

pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "passwd": MASKED_PASSWORD,
        "admin": user.admin,
        "name": user.name,
        "image": user.image,
        "created_at": user.created_at.to_rfc3339(),
    })
}

pub fn blog_to_json(blog: &Blog) -> Value {
    json!({
        "id": blog.id.to_string(),
        "user_id": blog.user_id.to_string(),
        "user_name": blog.user_name,
        "user_image": blog.user_image,
        "name": blog.name,
        "summary": blog.summary,
        "content": blog.content,
        "created_at": blog.created_at.to_rfc3339(),
    })
}

/// Blog for the detail page, with its content rendered as escaped paragraphs.
pub fn blog_detail_to_json(blog: &Blog) -> Value {
    let mut value = blog_to_json(blog);
    value["html_content"] = Value::String(text_to_html(&blog.content));
    value
}

pub fn comment_to_json(comment: &Comment) -> Value {
    json!({
        "id": comment.id.to_string(),
        "blog_id": comment.blog_id.to_string(),
        "user_id": comment.user_id.to_string(),
        "user_name": comment.user_name,
        "user_image": comment.user_image,
        "content": comment.content,
        "html_content": text_to_html(&comment.content),
        "created_at": comment.created_at.to_rfc3339(),
    })
}

/// `{page, items}` listing body.
pub fn listing_to_json(page: &Page, items: Vec<Value>) -> Value {
    json!({
        "page": page,
        "items": items,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use myblog_core::UserId;

    use super::*;

    #[test]
    fn user_json_never_carries_the_stored_password() {
        let user = User {
            id: UserId::new(),
            email: "a@b.cd".into(),
            passwd: "secret-digest".into(),
            admin: false,
            name: "A".into(),
            image: "about:blank".into(),
            created_at: Utc::now(),
        };
        let value = user_to_json(&user);
        assert_eq!(value["passwd"], MASKED_PASSWORD);
        assert!(!value.to_string().contains("secret-digest"));
    }

    #[test]
    fn listing_carries_page_fields() {
        let page = Page::new(0, 1, 10);
        let value = listing_to_json(&page, vec![]);
        assert_eq!(value["page"]["page_index"], 1);
        assert_eq!(value["page"]["limit"], 0);
        assert_eq!(value["items"], json!([]));
    }
}
