//! Blog posts, reader comments and per-post interaction counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BlogPostId, CommentId};

/// Average reading speed used for the "N min read" badge.
const WORDS_PER_MINUTE: usize = 200;

/// A blog post. The body is Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: String,
    pub body: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes: u64,
}

impl BlogPost {
    /// Estimated reading time in whole minutes (at least one).
    #[must_use]
    pub fn reading_minutes(&self) -> usize {
        self.body.split_whitespace().count().div_ceil(WORDS_PER_MINUTE).max(1)
    }

    /// The excerpt, or the first 160 characters of the body when no excerpt is set.
    #[must_use]
    pub fn summary(&self) -> String {
        if !self.excerpt.trim().is_empty() {
            return self.excerpt.clone();
        }
        let mut summary: String = self.body.chars().take(160).collect();
        if self.body.chars().count() > 160 {
            summary.push('…');
        }
        summary
    }

    /// Editable fields, for pre-filling the admin form.
    #[must_use]
    pub fn to_input(&self) -> BlogPostInput {
        BlogPostInput {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            body: self.body.clone(),
            cover_image_url: self.cover_image_url.clone(),
            author: self.author.clone(),
            tags: self.tags.clone(),
            published: self.published,
        }
    }
}

/// Create/update payload for a blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostInput {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub author: String,
    pub tags: Vec<String>,
    pub published: bool,
}

/// A reader comment on a blog post. Hidden until approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogComment {
    pub id: CommentId,
    pub post_id: BlogPostId,
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Payload for a public comment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub post_id: BlogPostId,
    pub author_name: String,
    pub content: String,
}

/// Likes and comment counts for one post, derived by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionSummary {
    pub post_id: BlogPostId,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub pending_comments: u64,
}

/// Derive a URL slug from a title: lowercase ASCII alphanumerics joined by `-`.
///
/// Common Latin accents are folded so `Promoção de Março` becomes
/// `promocao-de-marco`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }
    slug
}

const fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
