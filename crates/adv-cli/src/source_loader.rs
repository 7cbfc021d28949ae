use std::fs;
use std::path::{Path, PathBuf};

use adv_core::AdventureError;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan};

/// Sibling of each demo story; never a story itself.
pub(crate) const CASE_FILE_NAME: &str = "testcase.json";

pub(crate) fn resolve_story_file(story: &str) -> Result<PathBuf, AdventureError> {
    let absolute = absolutize(story)?;

    if !absolute.exists() {
        return Err(AdventureError::io(
            "CLI_SOURCE_NOT_FOUND",
            format!("story does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_file() {
        return Err(AdventureError::io(
            "CLI_SOURCE_NOT_FILE",
            format!("story is not a file: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn resolve_story_dir(dir: &str) -> Result<PathBuf, AdventureError> {
    let absolute = absolutize(dir)?;

    if !absolute.exists() {
        return Err(AdventureError::io(
            "CLI_SOURCE_NOT_FOUND",
            format!("dir does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(AdventureError::io(
            "CLI_SOURCE_NOT_DIR",
            format!("dir is not a directory: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn read_story(path: &Path) -> Result<String, AdventureError> {
    fs::read_to_string(path).map_err(map_cli_source_read)
}

/// Every `*.json` story under `dir`, sorted by path.
pub(crate) fn collect_story_files(dir: &Path) -> Result<Vec<PathBuf>, AdventureError> {
    let mut stories = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(map_cli_source_scan)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
        let is_case = path.file_name().and_then(|name| name.to_str()) == Some(CASE_FILE_NAME);
        if is_json && !is_case {
            stories.push(path.to_path_buf());
        }
    }

    if stories.is_empty() {
        return Err(AdventureError::io(
            "CLI_SOURCE_EMPTY",
            format!("No .json stories under {}", dir.display()),
        ));
    }

    Ok(stories)
}

fn absolutize(raw: &str) -> Result<PathBuf, AdventureError> {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()
        .map_err(map_cli_source_path)?
        .join(path))
}
