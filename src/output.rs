//! JSON and text files read and written by the harvester

use crate::config::SiteConfig;
use crate::error::HarvestError;
use crate::model::Recipe;
use crate::pipeline::Checkpoint;
use chrono::Local;
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// `{stem}_{YYYYmmdd_HHMMSS}.json`
pub fn timestamped_filename(stem: &str) -> String {
    format!("{}_{}.json", stem, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Pretty-printed JSON, with non-ASCII characters kept as they are
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn save_recipes(path: &Path, recipes: &[Recipe]) -> Result<(), HarvestError> {
    write_json(path, recipes)?;
    info!("Saved {} recipes to {}", recipes.len(), path.display());
    Ok(())
}

pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, HarvestError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn save_urls(path: &Path, urls: &[String]) -> Result<(), HarvestError> {
    write_json(path, urls)?;
    info!("Saved {} URLs to {}", urls.len(), path.display());
    Ok(())
}

/// URLs from a JSON array. A missing file yields an empty list.
pub fn load_urls(path: &Path) -> Result<Vec<String>, HarvestError> {
    match File::open(path) {
        Ok(file) => Ok(serde_json::from_reader(BufReader::new(file))?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("File {} not found", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// URLs from a plain text file, one per line.
///
/// Blank lines and `#` comments are ignored. Lines that are not HTTPS
/// URLs of the site are skipped with a warning.
pub fn read_url_list(path: &Path, site: &SiteConfig) -> Result<Vec<String>, HarvestError> {
    let content = fs::read_to_string(path)?;
    Ok(parse_url_list(&content, site))
}

pub fn parse_url_list(content: &str, site: &SiteConfig) -> Vec<String> {
    let https_prefix = site.base_url.replacen("http://", "https://", 1);

    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            if !line.starts_with(&https_prefix) {
                warn!("Skipping line {}: not a {} URL: {}", i + 1, https_prefix, line);
                return None;
            }
            Some(line.to_string())
        })
        .collect()
}

/// Writes checkpoints as JSON files into one directory.
pub struct FileCheckpoint {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FileCheckpoint {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far, oldest first
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Checkpoint for FileCheckpoint {
    fn save_progress(&mut self, recipes: &[Recipe]) -> Result<(), HarvestError> {
        let path = self
            .dir
            .join(format!("recipes_progress_{}.json", recipes.len()));
        save_recipes(&path, recipes)?;
        self.written.push(path);
        Ok(())
    }

    fn save_failures(&mut self, urls: &[String]) -> Result<(), HarvestError> {
        let path = self.dir.join("failed_urls.json");
        save_urls(&path, urls)?;
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_filename() {
        let name = timestamped_filename("recipes_50");
        assert!(name.starts_with("recipes_50_"));
        assert!(name.ends_with(".json"));
        // recipes_50_ + 8 digits + _ + 6 digits + .json
        assert_eq!(name.len(), "recipes_50_".len() + 15 + ".json".len());
    }

    #[test]
    fn test_parse_url_list() {
        let content = "\
# harvested last week
https://www.essen-und-trinken.de/rezepte/linsensuppe-rezept-1.html

   https://www.essen-und-trinken.de/rezepte/gulasch-rezept-2.html
http://www.essen-und-trinken.de/rezepte/insecure-rezept-3.html
https://www.chefkoch.de/rezepte/4/salat.html
";
        let urls = parse_url_list(content, &SiteConfig::default());
        assert_eq!(
            urls,
            vec![
                "https://www.essen-und-trinken.de/rezepte/linsensuppe-rezept-1.html",
                "https://www.essen-und-trinken.de/rezepte/gulasch-rezept-2.html",
            ]
        );
    }

    #[test]
    fn test_missing_url_file_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let urls = load_urls(&dir.path().join("recipe_urls.json")).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_urls_written_as_json_array() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("failed_urls.json");
        let urls = vec!["https://www.essen-und-trinken.de/rezepte/rösti-rezept-1.html".to_string()];

        save_urls(&path, &urls).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  \"https://"));
        assert!(content.contains("rösti"));
        assert_eq!(load_urls(&path).unwrap(), urls);
    }

    #[test]
    fn test_read_url_list_missing_file() {
        let result = read_url_list(Path::new("/nonexistent/urls.txt"), &SiteConfig::default());
        assert!(matches!(result, Err(HarvestError::IoError(_))));
    }
}
