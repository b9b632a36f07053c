//! Recipe import
//!
//! Fetches a recipe page and pulls the schema.org `Recipe` object out of its
//! JSON-LD blocks.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::grocery::IngredientSource;
use crate::models::RecipeCreate;

/// Sent with every page request; some sites refuse unknown agents
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Page request timeout
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

static LD_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script\b[^>]*\btype\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script\s*>"#)
        .expect("JSON-LD script pattern is valid")
});

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No Recipe JSON-LD schema found at {url}")]
    NoRecipe { url: String },
}

/// Structured recipe extracted from a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image: Option<String>,
    pub url: String,
}

impl IngredientSource for ScrapedRecipe {
    fn ingredient_lines(&self) -> &[String] {
        &self.ingredients
    }
}

impl ScrapedRecipe {
    /// Store form of this recipe, with the given tags
    pub fn into_create(self, tags: Vec<String>) -> RecipeCreate {
        RecipeCreate {
            title: self.title,
            ingredients: self.ingredients,
            instructions: self.instructions,
            image_url: self.image,
            source_url: Some(self.url),
            tags,
        }
    }
}

/// Fetch `url` and extract its recipe. Blocking; call from
/// `spawn_blocking` inside the async server.
pub fn fetch_recipe(url: &str) -> Result<ScrapedRecipe, ImportError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?;

    tracing::info!("Fetching recipe page {}", url);
    let html = client.get(url).send()?.error_for_status()?.text()?;
    extract_recipe(&html, url)
}

/// Extract the first schema.org `Recipe` found in the page's JSON-LD blocks
pub fn extract_recipe(html: &str, url: &str) -> Result<ScrapedRecipe, ImportError> {
    let recipe = LD_JSON_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str();
            match serde_json::from_str::<Value>(body.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Skipping unreadable JSON-LD block on {}: {}", url, e);
                    None
                }
            }
        })
        .find_map(|data| find_recipe(&data).cloned())
        .ok_or_else(|| ImportError::NoRecipe {
            url: url.to_string(),
        })?;

    let title = recipe
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Untitled")
        .to_string();

    let ingredients = match recipe.get("recipeIngredient") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(line)) => vec![line.clone()],
        _ => Vec::new(),
    };

    let instructions = recipe
        .get("recipeInstructions")
        .map(parse_instructions)
        .unwrap_or_default();

    Ok(ScrapedRecipe {
        title,
        ingredients,
        instructions,
        image: recipe.get("image").and_then(image_url),
        url: url.to_string(),
    })
}

/// Depth-first search for an object whose `@type` mentions `Recipe`
fn find_recipe(data: &Value) -> Option<&Value> {
    match data {
        Value::Object(map) => {
            let schema_type = match map.get("@type") {
                Some(Value::String(t)) => t.clone(),
                Some(Value::Array(types)) => types
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => String::new(),
            };
            if schema_type.contains("Recipe") {
                return Some(data);
            }
            map.get("@graph").and_then(find_recipe)
        }
        Value::Array(items) => items.iter().find_map(find_recipe),
        _ => None,
    }
}

/// Flatten `recipeInstructions` into plain steps
fn parse_instructions(raw: &Value) -> Vec<String> {
    let items: &[Value] = match raw {
        Value::String(step) => return vec![step.clone()],
        Value::Array(items) => items,
        Value::Object(_) => std::slice::from_ref(raw),
        _ => return Vec::new(),
    };

    let mut steps = Vec::new();
    for item in items {
        match item {
            Value::String(step) => steps.push(step.clone()),
            Value::Object(map) => {
                if map.get("@type").and_then(Value::as_str) == Some("HowToSection") {
                    if let Some(elements) = map.get("itemListElement") {
                        steps.extend(parse_instructions(elements));
                    }
                } else if let Some(text) = map.get("text").and_then(Value::as_str) {
                    if !text.is_empty() {
                        steps.push(text.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    steps
}

/// `image` may be a URL, a list of URLs or ImageObjects, or one ImageObject
fn image_url(image: &Value) -> Option<String> {
    match image {
        Value::String(url) => Some(url.clone()),
        Value::Array(items) => items.first().and_then(image_url),
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/pancakes";

    fn page(json: &str) -> String {
        format!(
            r#"<html><head>
            <script type="text/javascript">var x = 1;</script>
            <script type="application/ld+json">{}</script>
            </head><body>Pancakes</body></html>"#,
            json
        )
    }

    #[test]
    fn test_extract_direct_recipe() {
        let html = page(
            r#"{
                "@context": "https://schema.org",
                "@type": "Recipe",
                "name": "Fluffy Pancakes",
                "image": "https://example.com/p.jpg",
                "recipeIngredient": ["1 1/2 cups flour", "2 eggs"],
                "recipeInstructions": "Mix and fry."
            }"#,
        );
        let recipe = extract_recipe(&html, URL).unwrap();
        assert_eq!(recipe.title, "Fluffy Pancakes");
        assert_eq!(recipe.ingredients, vec!["1 1/2 cups flour", "2 eggs"]);
        assert_eq!(recipe.instructions, vec!["Mix and fry."]);
        assert_eq!(recipe.image.as_deref(), Some("https://example.com/p.jpg"));
        assert_eq!(recipe.url, URL);
    }

    #[test]
    fn test_extract_from_graph_with_type_list() {
        let html = page(
            r#"{
                "@context": "https://schema.org",
                "@graph": [
                    {"@type": "WebPage", "name": "Page"},
                    {"@type": ["Recipe", "NewsArticle"], "name": "Stew",
                     "image": [{"@type": "ImageObject", "url": "https://example.com/s.jpg"}],
                     "recipeIngredient": ["1 lb beef"]}
                ]
            }"#,
        );
        let recipe = extract_recipe(&html, URL).unwrap();
        assert_eq!(recipe.title, "Stew");
        assert_eq!(recipe.image.as_deref(), Some("https://example.com/s.jpg"));
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn test_extract_from_top_level_array_and_skips_bad_blocks() {
        let html = r#"<script type='application/ld+json'>{ not json </script>
            <SCRIPT TYPE="application/ld+json">[{"@type": "Organization"}, {"@type": "Recipe"}]</SCRIPT>"#;
        let recipe = extract_recipe(html, URL).unwrap();
        assert_eq!(recipe.title, "Untitled");
        assert!(recipe.ingredients.is_empty());
        assert_eq!(recipe.image, None);
    }

    #[test]
    fn test_instructions_flatten_sections() {
        let raw: Value = serde_json::from_str(
            r#"[
                "Preheat the oven.",
                {"@type": "HowToStep", "text": "Mix the batter."},
                {"@type": "HowToStep", "text": ""},
                {"@type": "HowToSection", "name": "Bake", "itemListElement": [
                    {"@type": "HowToStep", "text": "Pour into pan."},
                    {"@type": "HowToStep", "text": "Bake 30 minutes."}
                ]},
                42
            ]"#,
        )
        .unwrap();
        assert_eq!(
            parse_instructions(&raw),
            vec!["Preheat the oven.", "Mix the batter.", "Pour into pan.", "Bake 30 minutes."]
        );
    }

    #[test]
    fn test_image_object() {
        let raw: Value = serde_json::from_str(r#"{"url": "https://example.com/i.png"}"#).unwrap();
        assert_eq!(image_url(&raw).as_deref(), Some("https://example.com/i.png"));
        assert_eq!(image_url(&Value::Array(vec![])), None);
    }

    #[test]
    fn test_no_recipe() {
        let html = page(r#"{"@type": "Article", "name": "News"}"#);
        let err = extract_recipe(&html, URL).unwrap_err();
        assert!(matches!(err, ImportError::NoRecipe { .. }));
        assert!(err.to_string().contains(URL));

        assert!(extract_recipe("<html></html>", URL).is_err());
    }

    #[test]
    fn test_into_create_keeps_source() {
        let html = page(r#"{"@type": "Recipe", "name": "Soup", "recipeIngredient": ["1 can beans"]}"#);
        let recipe = extract_recipe(&html, URL).unwrap();
        assert_eq!(recipe.ingredient_lines(), ["1 can beans".to_string()]);

        let create = recipe.into_create(vec!["dinner".to_string()]);
        assert_eq!(create.source_url.as_deref(), Some(URL));
        assert_eq!(create.tags, vec!["dinner"]);
        assert_eq!(create.ingredients, vec!["1 can beans"]);
    }
}
