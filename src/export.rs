//! Saving prompt descriptions to disk

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::history::PromptRecord;
use crate::Result;

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static regex"))
}

/// Lowercase title with every non-alphanumeric run collapsed to `-`, plus `.txt`
pub fn download_filename(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = non_alphanumeric().replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "prompt.txt".to_string()
    } else {
        format!("{}.txt", slug)
    }
}

/// Where downloads go: the user's download folder, else the working directory
pub fn download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Write the prompt's description verbatim into `dir`
pub fn export_prompt(dir: &Path, record: &PromptRecord) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(download_filename(&record.title));
    std::fs::write(&path, &record.description)?;
    log::info!("Exported prompt '{}' to {}", record.title, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_title() {
        assert_eq!(download_filename("My Cool Prompt!!"), "my-cool-prompt.txt");
    }

    #[test]
    fn test_filename_collapses_runs_and_trims() {
        assert_eq!(download_filename("  --Hello__World--  "), "hello-world.txt");
        assert_eq!(download_filename("Sentry.io - Build with AI"), "sentry-io-build-with-ai.txt");
    }

    #[test]
    fn test_filename_defaults_to_prompt() {
        assert_eq!(download_filename(""), "prompt.txt");
        assert_eq!(download_filename("!!! ???"), "prompt.txt");
    }

    #[test]
    fn test_export_writes_description_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let record = PromptRecord {
            id: "prompt-1".to_string(),
            title: "My Cool Prompt!!".to_string(),
            description: "line one\n  line two\n".to_string(),
            tags: vec![],
        };

        let path = export_prompt(dir.path(), &record).unwrap();
        assert_eq!(path.file_name().unwrap(), "my-cool-prompt.txt");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line one\n  line two\n");
    }
}
