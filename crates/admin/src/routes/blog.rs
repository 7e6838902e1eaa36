//! Blog post and comment moderation route handlers.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use showroom_core::{
    BlogComment, BlogPost, BlogPostId, BlogPostInput, CommentId, InteractionSummary, slugify,
};

use crate::{
    components::{
        DataTableConfig, ListQuery, Visibility,
        data_table::{comments_table_config, posts_table_config},
    },
    filters,
    middleware::{AdminContext, RequireAdmin},
    services::Flash,
    state::AppState,
};

use super::{
    checked, dashboard::AdminUserView, date_label, done, failure_message, load, optional, render,
    settle,
};

const LIST_PATH: &str = "/admin/blog";
const COMMENTS_PATH: &str = "/admin/blog/comments";

/// Post view for the list page.
#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub tags: String,
    pub likes: u64,
    pub comments: u64,
    pub pending_comments: u64,
    pub published: bool,
    pub published_at: String,
}

impl PostRow {
    fn new(post: &BlogPost, summary: Option<&InteractionSummary>) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            author: post.author.clone(),
            tags: post.tags.join(", "),
            likes: summary.map_or(post.likes, |s| s.likes),
            comments: summary.map_or(0, |s| s.comments),
            pending_comments: summary.map_or(0, |s| s.pending_comments),
            published: post.published,
            published_at: date_label(post.published_at),
        }
    }
}

/// Comment view for the moderation page.
#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: CommentId,
    pub author: String,
    pub post_title: String,
    pub content: String,
    pub received: String,
    pub approved: bool,
}

/// Raw post form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    /// Derived from the title when left blank.
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub author: String,
    /// Comma-separated.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub published: Option<String>,
}

impl From<&BlogPost> for PostForm {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            body: post.body.clone(),
            cover_image_url: post.cover_image_url.clone().unwrap_or_default(),
            author: post.author.clone(),
            tags: post.tags.join(", "),
            published: post.published.then(|| "on".to_string()),
        }
    }
}

impl PostForm {
    #[must_use]
    pub fn is_published(&self) -> bool {
        checked(self.published.as_ref())
    }

    /// Validate and convert into the backend payload.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn parse(&self) -> Result<BlogPostInput, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required.".to_string());
        }
        if self.body.trim().is_empty() {
            return Err("Post body is required.".to_string());
        }

        let slug = match self.slug.trim() {
            "" => slugify(title),
            given => slugify(given),
        };
        if slug.is_empty() {
            return Err("Slug must contain letters or digits.".to_string());
        }

        let tags = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(BlogPostInput {
            title: title.to_string(),
            slug,
            excerpt: self.excerpt.trim().to_string(),
            body: self.body.clone(),
            cover_image_url: optional(&self.cover_image_url),
            author: self.author.trim().to_string(),
            tags,
            published: self.is_published(),
        })
    }
}

/// Blog posts list template.
#[derive(Template)]
#[template(path = "blog/index.html")]
pub struct PostsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub posts: Vec<PostRow>,
    pub pending_comments: u64,
    pub error: Option<String>,
}

/// Blog post create/edit form template.
#[derive(Template)]
#[template(path = "blog/form.html")]
pub struct PostFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub heading: String,
    pub action: String,
    pub form: PostForm,
    pub error: Option<String>,
}

/// Comment moderation template.
#[derive(Template)]
#[template(path = "blog/comments.html")]
pub struct CommentsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub table: DataTableConfig,
    pub query: ListQuery,
    pub comments: Vec<CommentRow>,
    pub error: Option<String>,
}

/// Build the blog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/blog", get(index).post(create))
        .route("/admin/blog/new", get(new_post))
        .route("/admin/blog/comments", get(comments))
        .route("/admin/blog/comments/{id}/approve", post(approve_comment))
        .route("/admin/blog/comments/{id}/delete", post(delete_comment))
        .route("/admin/blog/{id}", post(update))
        .route("/admin/blog/{id}/edit", get(edit))
        .route("/admin/blog/{id}/delete", post(delete))
}

fn post_rows(
    posts: &[BlogPost],
    summaries: &[InteractionSummary],
    query: &ListQuery,
) -> Vec<PostRow> {
    let by_post: HashMap<BlogPostId, &InteractionSummary> =
        summaries.iter().map(|s| (s.post_id, s)).collect();
    let needle = query.needle();
    let visibility = query.status_as::<Visibility>();

    posts
        .iter()
        .filter(|p| {
            needle.is_empty()
                || p.title.to_lowercase().contains(&needle)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        })
        .filter(|p| visibility.is_none_or(|v| v.allows(p.published)))
        .map(|p| PostRow::new(p, by_post.get(&p.id).copied()))
        .collect()
}

fn comment_rows(comments: &[BlogComment], posts: &[BlogPost], query: &ListQuery) -> Vec<CommentRow> {
    let titles: HashMap<BlogPostId, &str> =
        posts.iter().map(|p| (p.id, p.title.as_str())).collect();
    let needle = query.needle();
    let visibility = query.status_as::<Visibility>();

    let mut rows: Vec<CommentRow> = comments
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.author_name.to_lowercase().contains(&needle)
                || c.content.to_lowercase().contains(&needle)
        })
        .filter(|c| visibility.is_none_or(|v| v.allows(c.approved)))
        .map(|c| CommentRow {
            id: c.id,
            author: c.author_name.clone(),
            post_title: titles
                .get(&c.post_id)
                .map_or_else(|| format!("Post #{}", c.post_id), ToString::to_string),
            content: c.content.clone(),
            received: date_label(c.created_at),
            approved: c.approved,
        })
        .collect();
    // Pending first so moderation work is at the top.
    rows.sort_by_key(|r| r.approved);
    rows
}

async fn form_page(
    ctx: &AdminContext,
    heading: &str,
    action: String,
    form: PostForm,
    error: Option<String>,
) -> Response {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let template = PostFormTemplate {
        admin_user: AdminUserView::from(ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        heading: heading.to_string(),
        action,
        form,
        error,
    };
    (status, render(&template)).into_response()
}

/// Blog posts list page handler.
///
/// GET /admin/blog
#[instrument(skip(ctx, state))]
pub async fn index(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let queries = ctx.queries(&state);
    let (posts, error) = load(&ctx, queries.list::<BlogPost>().await).await?;
    // Counts are decoration; a failure here leaves them at zero.
    let (summaries, _) = load(&ctx, queries.interaction_summaries().await).await?;

    let template = PostsIndexTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: LIST_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: posts_table_config(),
        pending_comments: summaries.iter().map(|s| s.pending_comments).sum(),
        posts: post_rows(&posts, &summaries, &query),
        query,
        error,
    };

    Ok(render(&template))
}

/// GET /admin/blog/new
#[instrument(skip_all)]
pub async fn new_post(RequireAdmin(ctx): RequireAdmin) -> Response {
    let form = PostForm {
        author: ctx.role().to_string(),
        ..PostForm::default()
    };
    form_page(&ctx, "New post", LIST_PATH.to_string(), form, None).await
}

/// POST /admin/blog
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<PostForm>,
) -> Result<Response, Response> {
    let action = LIST_PATH.to_string();
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(form_page(&ctx, "New post", action, form, Some(message)).await),
    };

    match ctx.queries(&state).create::<BlogPost>(&input).await {
        Ok(post) => {
            tracing::info!(post_id = %post.id, slug = %post.slug, "Blog post created");
            Ok(done(&ctx, "Post created.", LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, "New post", action, form, Some(message)).await)
        }
    }
}

/// GET /admin/blog/{id}/edit
#[instrument(skip(ctx, state))]
pub async fn edit(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<Response, Response> {
    let post = settle(&ctx, ctx.queries(&state).get::<BlogPost>(id).await, LIST_PATH).await?;
    Ok(form_page(
        &ctx,
        "Edit post",
        format!("{LIST_PATH}/{id}"),
        PostForm::from(&post),
        None,
    )
    .await)
}

/// POST /admin/blog/{id}
#[instrument(skip(ctx, state, form))]
pub async fn update(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
    Form(form): Form<PostForm>,
) -> Result<Response, Response> {
    let action = format!("{LIST_PATH}/{id}");
    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => return Ok(form_page(&ctx, "Edit post", action, form, Some(message)).await),
    };

    match ctx.queries(&state).update::<BlogPost>(id, &input).await {
        Ok(_) => {
            tracing::info!(post_id = %id, "Blog post updated");
            Ok(done(&ctx, "Post saved.", LIST_PATH).await)
        }
        Err(err) => {
            let message = failure_message(&ctx, err).await?;
            Ok(form_page(&ctx, "Edit post", action, form, Some(message)).await)
        }
    }
}

/// POST /admin/blog/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<BlogPost>(id).await, LIST_PATH).await?;
    tracing::info!(post_id = %id, "Blog post deleted");
    Ok(done(&ctx, "Post deleted.", LIST_PATH).await)
}

/// Comment moderation page handler.
///
/// GET /admin/blog/comments
#[instrument(skip(ctx, state))]
pub async fn comments(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, Response> {
    let queries = ctx.queries(&state);
    let (comments, error) = load(&ctx, queries.list::<BlogComment>().await).await?;
    let (posts, _) = load(&ctx, queries.list::<BlogPost>().await).await?;

    let template = CommentsTemplate {
        admin_user: AdminUserView::from(&ctx),
        current_path: COMMENTS_PATH.to_string(),
        flash: Flash::take(ctx.store.session()).await,
        table: comments_table_config(),
        comments: comment_rows(&comments, &posts, &query),
        query,
        error,
    };

    Ok(render(&template))
}

/// POST /admin/blog/comments/{id}/approve
#[instrument(skip(ctx, state))]
pub async fn approve_comment(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).approve_comment(id).await, COMMENTS_PATH).await?;
    tracing::info!(comment_id = %id, "Comment approved");
    Ok(done(&ctx, "Comment approved.", COMMENTS_PATH).await)
}

/// POST /admin/blog/comments/{id}/delete
#[instrument(skip(ctx, state))]
pub async fn delete_comment(
    RequireAdmin(ctx): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> Result<Response, Response> {
    settle(&ctx, ctx.queries(&state).delete::<BlogComment>(id).await, COMMENTS_PATH).await?;
    tracing::info!(comment_id = %id, "Comment deleted");
    Ok(done(&ctx, "Comment deleted.", COMMENTS_PATH).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn post(id: u64, title: &str, tags: &[&str], published: bool) -> BlogPost {
        BlogPost {
            id: BlogPostId::new(id),
            title: title.to_string(),
            slug: slugify(title),
            excerpt: String::new(),
            body: "Body".to_string(),
            cover_image_url: None,
            author: "Equipe".to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            published,
            published_at: None,
            likes: 3,
        }
    }

    #[test]
    fn test_parse_derives_slug_and_splits_tags() {
        let form = PostForm {
            title: "Promoção de Março".to_string(),
            body: "Texto".to_string(),
            tags: " ofertas, ,sedan ".to_string(),
            ..PostForm::default()
        };
        let input = form.parse().unwrap();
        assert_eq!(input.slug, "promocao-de-marco");
        assert_eq!(input.tags, vec!["ofertas", "sedan"]);
        assert!(!input.published);
    }

    #[test]
    fn test_parse_normalizes_given_slug() {
        let form = PostForm {
            title: "Anything".to_string(),
            slug: "My Custom Slug".to_string(),
            body: "Texto".to_string(),
            ..PostForm::default()
        };
        assert_eq!(form.parse().unwrap().slug, "my-custom-slug");

        let punct = PostForm {
            title: "!!!".to_string(),
            body: "Texto".to_string(),
            ..PostForm::default()
        };
        assert_eq!(
            punct.parse().unwrap_err(),
            "Slug must contain letters or digits."
        );
    }

    #[test]
    fn test_post_rows_use_summaries_and_tag_search() {
        let posts = vec![
            post(1, "Financing tips", &["credit"], true),
            post(2, "New arrivals", &["stock"], false),
        ];
        let summaries = vec![InteractionSummary {
            post_id: BlogPostId::new(1),
            likes: 10,
            comments: 4,
            pending_comments: 1,
        }];

        let all = post_rows(&posts, &summaries, &ListQuery::default());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].likes, 10);
        assert_eq!(all[0].comments, 4);
        assert_eq!(all[1].likes, 3);

        let query = ListQuery {
            q: Some("CREDIT".to_string()),
            status: None,
        };
        let found = post_rows(&posts, &summaries, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Financing tips");

        let drafts = ListQuery {
            q: None,
            status: Some("hidden".to_string()),
        };
        assert_eq!(post_rows(&posts, &summaries, &drafts)[0].id, BlogPostId::new(2));
    }

    #[test]
    fn test_comment_rows_pending_first_with_titles() {
        let posts = vec![post(1, "Financing tips", &[], true)];
        let comment = |id: u64, post_id: u64, approved: bool| BlogComment {
            id: CommentId::new(id),
            post_id: BlogPostId::new(post_id),
            author_name: "Rita".to_string(),
            content: "Nice".to_string(),
            approved,
            created_at: None,
        };
        let comments = vec![comment(1, 1, true), comment(2, 9, false)];

        let rows = comment_rows(&comments, &posts, &ListQuery::default());
        assert_eq!(rows[0].id, CommentId::new(2));
        assert_eq!(rows[0].post_title, "Post #9");
        assert_eq!(rows[1].post_title, "Financing tips");
    }
}
