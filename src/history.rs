//! In-memory saved-prompt history with tag search

/// A saved prompt
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl PromptRecord {
    /// Create a record with a fresh id
    pub fn new(title: String, description: String, tags: Vec<String>) -> Self {
        Self {
            id: format!("prompt-{}", uuid::Uuid::new_v4()),
            title,
            description,
            tags,
        }
    }
}

/// Split free-form tag input on whitespace and commas, dropping a leading `#`
pub fn parse_tag_input(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|tag| tag.strip_prefix('#').unwrap_or(tag).trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased search tokens with any leading `#` removed
pub fn search_tokens(term: &str) -> Vec<String> {
    term.to_lowercase()
        .split_whitespace()
        .map(|token| token.strip_prefix('#').unwrap_or(token).to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// True when every token names one of the prompt's tags (case-insensitive)
pub fn matches_tags(record: &PromptRecord, tokens: &[String]) -> bool {
    let tags: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();
    tokens.iter().all(|token| tags.contains(token))
}

#[derive(Debug, Default)]
pub struct PromptHistory {
    prompts: Vec<PromptRecord>,
}

impl PromptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History pre-filled with the example prompts shown on first launch
    pub fn seeded() -> Self {
        let prompts = SEED_PROMPTS
            .iter()
            .enumerate()
            .map(|(index, (title, description, tags))| PromptRecord {
                id: format!("prompt-{}", index),
                title: title.to_string(),
                description: description.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .collect();
        Self { prompts }
    }

    pub fn prompts(&self) -> &[PromptRecord] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PromptRecord> {
        self.prompts.iter().find(|p| p.id == id)
    }

    /// Newest prompts go first
    pub fn prepend(&mut self, record: PromptRecord) {
        log::info!("Saved prompt '{}'", record.title);
        self.prompts.insert(0, record);
    }

    /// Remove by id; returns whether anything was removed
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.prompts.len();
        self.prompts.retain(|p| p.id != id);
        self.prompts.len() != before
    }

    /// Prompts matching a tag search term; an empty term matches everything
    pub fn search(&self, term: &str) -> Vec<&PromptRecord> {
        let tokens = search_tokens(term);
        self.prompts
            .iter()
            .filter(|p| matches_tags(p, &tokens))
            .collect()
    }
}

const SEED_PROMPTS: &[(&str, &str, &[&str])] = &[
    (
        "FastAPI Python Cursor Rules",
        "You are an expert in Python, FastAPI, and scalable API development....",
        &["python", "fastapi", "api"],
    ),
    (
        "Jupyter Data Analyst Python Cursor Rules",
        "You are an expert in data analysis, visualization, and Jupyter No...",
        &["python", "jupyter", "data analysis"],
    ),
    (
        "Deep Learning Developer Python Cursor Rules",
        "You are an expert in deep learning, transformers, diffusion model...",
        &["python", "pytorch", "tensorflow"],
    ),
    (
        "Django Python Cursor Rules",
        "You are an expert in Python, Django, and scalable web application d...",
        &["django", "python"],
    ),
    (
        "Flask Python Cursor Rules",
        "You are an expert in Python, Flask, and scalable API development.",
        &["python", "flask", "api"],
    ),
    (
        "FastAPI Python Microservices Serverless C...",
        "You are an expert in Python, FastAPI, microservices architecture, a...",
        &["fastapi", "uvicorn", "redis", "microservices"],
    ),
    (
        "Python Function Reflection Assistant",
        "You are a Python programming assistant. You will be given a function ...",
        &["python", "code generation"],
    ),
    (
        "JAX Best Practices",
        "You are an expert in JAX, Python, NumPy, and Machine Learning.",
        &["jax", "numpy", "machine learning"],
    ),
    (
        "Sentry.io - Build with AI, debug broken c...",
        "Monitor your AI agents with Sentry. Cursor.directory users get 3 months free of our team plan here.",
        &["sentry", "ai", "debugging"],
    ),
    (
        "Modern Web Scraping",
        "You are an expert in web scraping and data extraction, with a...",
        &["web scraping", "beautifulsoup", "firecrawl"],
    ),
    (
        "Python Test Case Generator",
        "Test Case Generation Prompt. You are an AI coding assistant that can w...",
        &["python", "testing", "unittest"],
    ),
    (
        "RoboCorp Python Cursor Rules",
        "You are an expert in Python, RoboCorp, and scalable RPA development...",
        &["python", "rpa", "robocorp"],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, tags: &[&str]) -> PromptRecord {
        PromptRecord {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn history_of(records: Vec<PromptRecord>) -> PromptHistory {
        PromptHistory { prompts: records }
    }

    fn ids(results: Vec<&PromptRecord>) -> Vec<&str> {
        results.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_hash_prefix_is_ignored() {
        let history = history_of(vec![record("p", &["python", "api"]), record("g", &["go"])]);
        assert_eq!(ids(history.search("python")), vec!["p"]);
        assert_eq!(ids(history.search("#python")), vec!["p"]);
    }

    #[test]
    fn test_all_tokens_must_match() {
        let history = history_of(vec![
            record("py", &["python", "api"]),
            record("both", &["python", "go"]),
            record("go", &["go"]),
        ]);
        assert_eq!(ids(history.search("python go")), vec!["both"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let history = history_of(vec![record("p", &["Python"])]);
        assert_eq!(ids(history.search("PYTHON")), vec!["p"]);
    }

    #[test]
    fn test_empty_term_matches_everything() {
        let history = history_of(vec![record("a", &["x"]), record("b", &[])]);
        assert_eq!(history.search("").len(), 2);
        assert_eq!(history.search("   # ").len(), 2);
    }

    #[test]
    fn test_tags_match_whole_words_only() {
        let history = history_of(vec![record("p", &["python"])]);
        assert!(history.search("pyth").is_empty());
    }

    #[test]
    fn test_prepend_and_delete() {
        let mut history = PromptHistory::seeded();
        assert_eq!(history.len(), 12);
        assert_eq!(history.prompts()[0].id, "prompt-0");

        let saved = PromptRecord::new("New".to_string(), "text".to_string(), vec![]);
        let saved_id = saved.id.clone();
        history.prepend(saved);
        assert_eq!(history.prompts()[0].id, saved_id);
        assert_eq!(history.len(), 13);

        assert!(history.delete(&saved_id));
        assert!(!history.delete(&saved_id));
        assert!(history.get(&saved_id).is_none());
        assert_eq!(history.len(), 12);
    }

    #[test]
    fn test_parse_tag_input() {
        assert_eq!(
            parse_tag_input("#python, api  #rust,,"),
            vec!["python".to_string(), "api".to_string(), "rust".to_string()]
        );
        assert!(parse_tag_input("  , # ").is_empty());
    }
}
