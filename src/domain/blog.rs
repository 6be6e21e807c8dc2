use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image: Option<String>,
    pub author: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating or replacing a blog post
#[derive(Debug, Clone, Deserialize)]
pub struct BlogPostInput {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl BlogPostInput {
    /// Checks required fields and fills the slug from the title when missing
    pub fn validated(mut self) -> Result<Self, String> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err("title is required".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content is required".to_string());
        }

        let slug = slugify(self.slug.as_deref().unwrap_or(&self.title));
        if slug.is_empty() {
            return Err("slug must contain at least one letter or digit".to_string());
        }
        self.slug = Some(slug);

        Ok(self)
    }

    pub fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }
}

/// URL-safe slug: lowercase ASCII alphanumerics separated by single dashes.
/// Common accented Latin letters are folded to their base letter.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        let ch = match ch {
            'à' | 'á' | 'â' | 'ä' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            other => other,
        };

        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_folds_accents_and_collapses_separators() {
        assert_eq!(slugify("Perché comprare casa   a Roma?"), "perche-comprare-casa-a-roma");
        assert_eq!(slugify("--Già   fatto--"), "gia-fatto");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn validation_derives_slug_from_title() {
        let input = BlogPostInput {
            title: " Mutuo: guida 2024 ".to_string(),
            slug: None,
            excerpt: None,
            content: "Testo".to_string(),
            cover_image: None,
            author: None,
            published: true,
        }
        .validated()
        .unwrap();

        assert_eq!(input.title, "Mutuo: guida 2024");
        assert_eq!(input.slug(), "mutuo-guida-2024");
    }

    #[test]
    fn validation_rejects_empty_content() {
        let input = BlogPostInput {
            title: "Titolo".to_string(),
            slug: Some("custom".to_string()),
            excerpt: None,
            content: "  ".to_string(),
            cover_image: None,
            author: None,
            published: false,
        };
        assert!(input.validated().is_err());
    }
}
