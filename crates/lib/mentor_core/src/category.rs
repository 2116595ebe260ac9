// @awa-component: RELAY-Category
//
//! User categories and the conversation key derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session id used when the caller does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default";

const ASPIRING_INSTRUCTION: &str = "You are an entrepreneurship AI mentor and people can ask you suggestions and instructions to how to start or implement their business idea in real time. You have to provide them the step by step procedures to implement their business and helps them to become an entrepreneur.

Focus on:
- Step-by-step implementation procedures
- Practical and actionable advice
- Legal requirements and compliance
- Market validation strategies
- Startup fundamentals and best practices
- Resource allocation and budgeting
- Timeline planning and milestones

Always provide detailed, structured responses with clear action items.";

const EXISTING_INSTRUCTION: &str = "You are a business growth strategist and digital transformation expert.
Help existing business owners scale, automate, and digitally transform their businesses.
Provide suggestions on marketing strategies, technology adoption, operational efficiency, and funding options.
Focus on growth tactics, competitive positioning, and sustainable business expansion.

Always provide step-by-step guidance for implementation.";

const GENERAL_INSTRUCTION: &str = "You are an entrepreneurship AI mentor and people can ask you suggestions and instructions to how to start or implement their business idea in real time. You have to provide them the step by step procedures to implement their business and helps them to become an entrepreneur.";

/// Caller-declared classification of the user.
///
/// Selects the system instruction that governs a conversation for its whole
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Aspiring,
    Existing,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Aspiring, Category::Existing, Category::General];

    /// Parse a category name, coercing anything unrecognised to [`Category::General`].
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("aspiring") => Category::Aspiring,
            Some("existing") => Category::Existing,
            _ => Category::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Aspiring => "aspiring",
            Category::Existing => "existing",
            Category::General => "general",
        }
    }

    /// System instruction bound to conversations of this category.
    pub fn instruction(self) -> &'static str {
        match self {
            Category::Aspiring => ASPIRING_INSTRUCTION,
            Category::Existing => EXISTING_INSTRUCTION,
            Category::General => GENERAL_INSTRUCTION,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one conversation slot in the session table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub category: Category,
    pub session_id: String,
}

impl ConversationKey {
    pub fn new(category: Category, session_id: impl Into<String>) -> Self {
        Self {
            category,
            session_id: session_id.into(),
        }
    }

    /// Build a key from optional caller input, applying the category and
    /// session id fallbacks.
    pub fn resolve(category: Option<&str>, session_id: Option<&str>) -> Self {
        let session_id = session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SESSION_ID);
        Self::new(Category::parse_or_default(category), session_id)
    }
}

/// Renders as `category_sessionId`.
impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category, self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_parse() {
        assert_eq!(Category::parse_or_default(Some("aspiring")), Category::Aspiring);
        assert_eq!(Category::parse_or_default(Some("existing")), Category::Existing);
        assert_eq!(Category::parse_or_default(Some("general")), Category::General);
    }

    #[test]
    fn unknown_category_falls_back_to_general() {
        assert_eq!(Category::parse_or_default(Some("unknown-value")), Category::General);
        assert_eq!(Category::parse_or_default(Some("")), Category::General);
        assert_eq!(Category::parse_or_default(Some("ASPIRING")), Category::General);
        assert_eq!(Category::parse_or_default(None), Category::General);
    }

    #[test]
    fn each_category_has_distinct_instruction() {
        assert_ne!(Category::Aspiring.instruction(), Category::Existing.instruction());
        assert!(Category::Existing.instruction().contains("growth strategist"));
        assert!(Category::ALL.iter().all(|c| !c.instruction().is_empty()));
    }

    #[test]
    fn key_display_joins_category_and_session() {
        let key = ConversationKey::new(Category::Aspiring, "s1");
        assert_eq!(key.to_string(), "aspiring_s1");
    }

    #[test]
    fn resolve_applies_defaults() {
        let key = ConversationKey::resolve(None, None);
        assert_eq!(key, ConversationKey::new(Category::General, "default"));

        let key = ConversationKey::resolve(Some("existing"), Some("   "));
        assert_eq!(key.to_string(), "existing_default");
    }

    #[test]
    fn resolve_keeps_session_id_verbatim() {
        let key = ConversationKey::resolve(Some("general"), Some(" s1 "));
        assert_eq!(key.session_id, " s1 ");
        assert_ne!(key, ConversationKey::resolve(Some("general"), Some("s1")));
    }

    #[test]
    fn keys_with_same_parts_are_equal() {
        let a = ConversationKey::resolve(Some("aspiring"), Some("s1"));
        let b = ConversationKey::new(Category::Aspiring, String::from("s1"));
        assert_eq!(a, b);
        assert_ne!(a, ConversationKey::new(Category::General, "s1"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Category::Existing).unwrap();
        assert_eq!(json, "\"existing\"");
    }
}
