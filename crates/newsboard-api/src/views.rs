//! Page rendering seam. Handlers hand plain data to a [`Views`]
//! implementation and send back whatever HTML it produces.

use askama::Template;

use newsboard_types::api::PostSummary;

pub trait Views: Send + Sync {
    fn homepage(&self, posts: &[PostSummary], logged_in: bool) -> anyhow::Result<String>;
    fn login(&self) -> anyhow::Result<String>;
}

#[derive(Template)]
#[template(path = "homepage.html")]
struct HomepageTemplate<'a> {
    posts: &'a [PostSummary],
    logged_in: bool,
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate;

/// Askama pages from `templates/`, no stylesheet or scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainViews;

impl Views for PlainViews {
    fn homepage(&self, posts: &[PostSummary], logged_in: bool) -> anyhow::Result<String> {
        Ok(HomepageTemplate { posts, logged_in }.render()?)
    }

    fn login(&self) -> anyhow::Result<String> {
        Ok(LoginTemplate.render()?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use newsboard_types::api::{Author, PostComment};

    use super::*;

    fn summary(title: &str, vote_count: i64, comments: Vec<PostComment>) -> PostSummary {
        PostSummary {
            id: 1,
            post_url: "https://example.com/?a=1&b=2".into(),
            title: title.into(),
            created_at: Utc::now(),
            vote_count,
            comments,
            user: Author {
                username: "alice".into(),
            },
        }
    }

    #[test]
    fn homepage_escapes_user_content() {
        let posts = vec![summary("<script>alert(1)</script>", 1, vec![])];

        let html = PlainViews.homepage(&posts, false).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("a=1&amp;b=2"));
        assert!(html.contains("1 point by alice"));
        assert!(html.contains("0 comments"));
        assert!(html.contains(r#"href="/login""#));
    }

    #[test]
    fn homepage_pluralises_and_shows_logout() {
        let comment = PostComment {
            id: 7,
            comment_text: "nice".into(),
            post_id: 1,
            user_id: 2,
            created_at: Utc::now(),
            user: Author {
                username: "bob".into(),
            },
        };
        let posts = vec![summary("Counting", 3, vec![comment])];

        let html = PlainViews.homepage(&posts, true).unwrap();
        assert!(html.contains("3 points by alice"));
        assert!(html.contains("1 comment<"));
        assert!(html.contains("Log out"));
        assert!(!html.contains(r#"href="/login""#));
    }

    #[test]
    fn login_page_has_both_forms() {
        let html = PlainViews.login().unwrap();
        assert!(html.contains(r#"id="login-form""#));
        assert!(html.contains(r#"id="signup-form""#));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
