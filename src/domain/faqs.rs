use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// FAQ entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating or replacing an FAQ entry
#[derive(Debug, Clone, Deserialize)]
pub struct FaqInput {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

impl FaqInput {
    pub fn validated(mut self) -> Result<Self, String> {
        self.question = self.question.trim().to_string();
        self.answer = self.answer.trim().to_string();
        if self.question.is_empty() {
            return Err("question is required".to_string());
        }
        if self.answer.is_empty() {
            return Err("answer is required".to_string());
        }
        self.category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(self)
    }
}

/// FAQ entries grouped by category, in display order
#[derive(Debug, Clone, Serialize)]
pub struct FaqGroup {
    pub category: Option<String>,
    pub items: Vec<Faq>,
}

/// Groups already-ordered entries, keeping the first-seen order of categories
pub fn group_by_category(faqs: Vec<Faq>) -> Vec<FaqGroup> {
    let mut groups: Vec<FaqGroup> = Vec::new();
    for faq in faqs {
        match groups.iter_mut().find(|g| g.category == faq.category) {
            Some(group) => group.items.push(faq),
            None => groups.push(FaqGroup {
                category: faq.category.clone(),
                items: vec![faq],
            }),
        }
    }
    groups
}
