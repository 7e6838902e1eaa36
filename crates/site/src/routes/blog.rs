//! Blog route handlers.
//!
//! Post bodies are markdown rendered server-side. Comments are held for
//! moderation; likes count once per visitor session.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use showroom_core::{BlogComment, BlogPost, BlogPostId, CommentInput};

use crate::content::render_markdown;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::form_rate_limiter;
use crate::state::AppState;

use super::SiteView;

/// Session key holding the ids of posts this visitor already liked.
pub const LIKED_POSTS_KEY: &str = "liked_posts";

const MAX_COMMENT_CHARS: usize = 1000;
const MAX_NAME_CHARS: usize = 80;

fn date_label(at: Option<DateTime<Utc>>) -> String {
    at.map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Post summary for the blog index and the home page.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub cover: Option<String>,
    pub author: String,
    pub published: String,
    pub reading_minutes: usize,
    pub tags: Vec<String>,
    pub likes: u64,
}

impl From<&BlogPost> for PostCard {
    fn from(post: &BlogPost) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            summary: post.summary(),
            cover: post.cover_image_url.clone(),
            author: post.author.clone(),
            published: date_label(post.published_at),
            reading_minutes: post.reading_minutes(),
            tags: post.tags.clone(),
            likes: post.likes,
        }
    }
}

/// Full post view.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: BlogPostId,
    pub slug: String,
    pub title: String,
    pub author: String,
    pub published: String,
    pub cover: Option<String>,
    pub tags: Vec<String>,
    pub content_html: String,
    pub reading_minutes: usize,
    pub likes: u64,
}

impl From<&BlogPost> for PostView {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            author: post.author.clone(),
            published: date_label(post.published_at),
            cover: post.cover_image_url.clone(),
            tags: post.tags.clone(),
            content_html: render_markdown(&post.body),
            reading_minutes: post.reading_minutes(),
            likes: post.likes,
        }
    }
}

/// Approved comment.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub author: String,
    pub content: String,
    pub posted: String,
}

impl From<&BlogComment> for CommentView {
    fn from(c: &BlogComment) -> Self {
        Self {
            author: c.author_name.clone(),
            content: c.content.clone(),
            posted: date_label(c.created_at),
        }
    }
}

/// `?tag=` on the blog index.
#[derive(Debug, Default, Deserialize)]
pub struct TagQuery {
    #[serde(default)]
    pub tag: Option<String>,
}

/// `?commented=1` after a comment was accepted.
#[derive(Debug, Default, Deserialize)]
pub struct CommentedQuery {
    #[serde(default)]
    pub commented: Option<String>,
}

/// Raw comment form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub content: String,
}

impl CommentForm {
    /// Validate and convert into a comment on `post_id`.
    ///
    /// # Errors
    ///
    /// Returns a message for the visitor naming the first invalid field.
    pub fn parse(&self, post_id: BlogPostId) -> std::result::Result<CommentInput, String> {
        let author_name = self.author_name.trim();
        let content = self.content.trim();
        if author_name.is_empty() || content.is_empty() {
            return Err("Name and comment are both required.".to_string());
        }
        if author_name.chars().count() > MAX_NAME_CHARS {
            return Err(format!("Names are limited to {MAX_NAME_CHARS} characters."));
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(format!(
                "Comments are limited to {MAX_COMMENT_CHARS} characters."
            ));
        }
        Ok(CommentInput {
            post_id,
            author_name: author_name.to_string(),
            content: content.to_string(),
        })
    }
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub posts: Vec<PostCard>,
    pub tags: Vec<String>,
    pub active_tag: Option<String>,
}

/// Blog post page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogPostTemplate {
    pub site: SiteView,
    pub current_path: String,
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub liked: bool,
    pub form: CommentForm,
    pub error: Option<String>,
    pub commented: bool,
}

/// Create the blog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{slug}", get(show))
        .route(
            "/{slug}/comments",
            post(add_comment).layer(form_rate_limiter()),
        )
        .route("/{slug}/like", post(like).layer(form_rate_limiter()))
}

/// Every tag in use, deduplicated case-insensitively and sorted.
fn all_tags(posts: &[BlogPost]) -> Vec<String> {
    let mut tags: Vec<String> = posts
        .iter()
        .flat_map(|p| p.tags.iter())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort_by_key(|t| t.to_lowercase());
    tags.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    tags
}

fn has_tag(post: &BlogPost, tag: &str) -> bool {
    post.tags.iter().any(|t| t.trim().eq_ignore_ascii_case(tag))
}

async fn liked_posts(session: &Session) -> BTreeSet<BlogPostId> {
    match session.get::<BTreeSet<BlogPostId>>(LIKED_POSTS_KEY).await {
        Ok(liked) => liked.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Could not read liked posts");
            BTreeSet::new()
        }
    }
}

async fn load_post(state: &AppState, slug: &str) -> Result<BlogPost> {
    state
        .catalog()
        .post(slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))
}

async fn post_page(
    state: &AppState,
    session: &Session,
    post: &BlogPost,
    form: CommentForm,
    error: Option<String>,
    commented: bool,
) -> BlogPostTemplate {
    let comments = match state.catalog().comments(post.id).await {
        Ok(comments) => comments.iter().map(CommentView::from).collect(),
        Err(e) => {
            warn!(error = %e, post_id = %post.id, "Comments unavailable");
            Vec::new()
        }
    };
    BlogPostTemplate {
        site: SiteView::of(state),
        current_path: "/blog".to_string(),
        post: PostView::from(post),
        comments,
        liked: liked_posts(session).await.contains(&post.id),
        form,
        error,
        commented,
    }
}

/// Display published posts, optionally narrowed to one tag.
///
/// GET /blog
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<TagQuery>,
) -> Result<BlogIndexTemplate> {
    let posts = state.catalog().posts().await?;
    let active_tag = query
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);

    let cards = posts
        .iter()
        .filter(|p| active_tag.as_deref().is_none_or(|tag| has_tag(p, tag)))
        .map(PostCard::from)
        .collect();

    Ok(BlogIndexTemplate {
        site: SiteView::of(&state),
        current_path: "/blog".to_string(),
        posts: cards,
        tags: all_tags(&posts),
        active_tag,
    })
}

/// Display a single post with its approved comments.
///
/// GET /blog/{slug}
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(query): Query<CommentedQuery>,
) -> Result<BlogPostTemplate> {
    let post = load_post(&state, &slug).await?;
    let commented = query.commented.is_some_and(|v| v == "1");
    Ok(post_page(&state, &session, &post, CommentForm::default(), None, commented).await)
}

/// Add a comment; it is published once approved.
///
/// POST /blog/{slug}/comments
#[instrument(skip(state, session, form))]
pub async fn add_comment(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response> {
    let post = load_post(&state, &slug).await?;

    let input = match form.parse(post.id) {
        Ok(input) => input,
        Err(message) => {
            let page = post_page(&state, &session, &post, form, Some(message), false).await;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    if let Err(e) = state.backend().add_comment(&input).await {
        error!(error = %e, post_id = %post.id, "Failed to add comment");
        let page = post_page(
            &state,
            &session,
            &post,
            form,
            Some("We could not post your comment right now. Please try again.".to_string()),
            false,
        )
        .await;
        return Ok((StatusCode::BAD_GATEWAY, page).into_response());
    }

    add_breadcrumb("blog", "Submitted comment", Some(&[("slug", slug.as_str())]));
    info!(post_id = %post.id, "Comment submitted for approval");
    Ok(Redirect::to(&format!("/blog/{slug}?commented=1#comments")).into_response())
}

/// Like a post once per session.
///
/// POST /blog/{slug}/like
#[instrument(skip(state, session))]
pub async fn like(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Redirect> {
    let post = load_post(&state, &slug).await?;
    let back = format!("/blog/{slug}#likes");

    let mut liked = liked_posts(&session).await;
    if liked.contains(&post.id) {
        return Ok(Redirect::to(&back));
    }

    let likes = state.catalog().like(post.id).await?;
    info!(post_id = %post.id, likes = ?likes, "Post liked");

    liked.insert(post.id);
    if let Err(e) = session.insert(LIKED_POSTS_KEY, &liked).await {
        warn!(error = %e, "Could not store liked posts");
    }
    Ok(Redirect::to(&back))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn post(id: u64, tags: &[&str]) -> BlogPost {
        BlogPost {
            id: BlogPostId::new(id),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            excerpt: String::new(),
            body: "Body".to_string(),
            cover_image_url: None,
            author: "Staff".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            published: true,
            published_at: None,
            likes: 0,
        }
    }

    #[test]
    fn test_all_tags_dedups_case_insensitively() {
        let posts = vec![post(1, &["SUV", "tips"]), post(2, &["suv", " ", "Financing"])];
        assert_eq!(all_tags(&posts), vec!["Financing", "SUV", "tips"]);
    }

    #[test]
    fn test_has_tag_ignores_case() {
        assert!(has_tag(&post(1, &["Financing"]), "financing"));
        assert!(!has_tag(&post(1, &["Financing"]), "suv"));
    }

    #[test]
    fn test_comment_form_validation() {
        let id = BlogPostId::new(3);
        let ok = CommentForm {
            author_name: " Rui ".to_string(),
            content: " Nice read ".to_string(),
        }
        .parse(id)
        .unwrap();
        assert_eq!(ok.post_id, id);
        assert_eq!(ok.author_name, "Rui");
        assert_eq!(ok.content, "Nice read");

        let blank = CommentForm::default();
        assert!(blank.parse(id).is_err());

        let long = CommentForm {
            author_name: "Rui".to_string(),
            content: "x".repeat(MAX_COMMENT_CHARS + 1),
        };
        assert!(long.parse(id).is_err());
    }

    #[test]
    fn test_post_view_renders_markdown() {
        let mut p = post(1, &[]);
        p.body = "**bold**".to_string();
        assert!(PostView::from(&p).content_html.contains("<strong>bold</strong>"));
    }
}
