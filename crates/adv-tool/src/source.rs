use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{AdvToolError, TestCase, TESTCASE_SCHEMA_V1};

pub const STORY_FILE_NAME: &str = "story.json";
const CASE_FILE_NAME: &str = "testcase.json";

pub fn read_story_from_dir(story_dir: &Path) -> Result<String, AdvToolError> {
    let path = story_dir.join(STORY_FILE_NAME);
    fs::read_to_string(&path).map_err(|source| AdvToolError::ReadFile { path, source })
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, AdvToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| AdvToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase = serde_json::from_str(&raw).map_err(|source| AdvToolError::ParseCase {
        path: case_path.to_path_buf(),
        source,
    })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(AdvToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

/// Directories under `root` holding both a story and a testcase, sorted.
pub fn discover_cases(root: &Path) -> Result<Vec<PathBuf>, AdvToolError> {
    let mut dirs = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| AdvToolError::Scan {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || entry.file_name() != CASE_FILE_NAME {
            continue;
        }

        if let Some(dir) = entry.path().parent() {
            if dir.join(STORY_FILE_NAME).is_file() {
                dirs.push(dir.to_path_buf());
            }
        }
    }

    Ok(dirs)
}

#[cfg(test)]
mod source_tests {
    use super::*;

    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("adv-tool-{}-{}", name, nanos))
    }

    fn write_file(path: &Path, content: &str) {
        let parent = path.parent().expect("path should have parent");
        fs::create_dir_all(parent).expect("parent dir should be created");
        fs::write(path, content).expect("file should be written");
    }

    #[test]
    fn read_story_from_dir_reads_story_json() {
        let root = temp_dir("story");
        write_file(&root.join("story.json"), "{}");
        assert_eq!(read_story_from_dir(&root).expect("story should read"), "{}");

        let empty = temp_dir("no-story");
        fs::create_dir_all(&empty).expect("root should be created");
        let error = read_story_from_dir(&empty).expect_err("missing story should fail");
        assert!(matches!(error, AdvToolError::ReadFile { .. }));
    }

    #[test]
    fn discover_cases_requires_story_and_case() {
        let root = temp_dir("discover");
        write_file(&root.join("b/story.json"), "{}");
        write_file(&root.join("b/testcase.json"), "{}");
        write_file(&root.join("a/story.json"), "{}");
        write_file(&root.join("a/testcase.json"), "{}");
        write_file(&root.join("only-story/story.json"), "{}");
        write_file(&root.join("only-case/testcase.json"), "{}");

        let dirs = discover_cases(&root).expect("scan should pass");
        assert_eq!(dirs, vec![root.join("a"), root.join("b")]);
    }

    #[test]
    fn read_test_case_parses_valid_json() {
        let root = temp_dir("case-ok");
        let case_path = root.join("testcase.json");
        write_file(
            &case_path,
            r#"{
  "schemaVersion":"adv-tool-case.v1",
  "entry":"intro",
  "actions":[],
  "expectedEvents":[{"kind":"end"}]
}"#,
        );

        let parsed = read_test_case(&case_path).expect("case should parse");
        assert_eq!(parsed.schema_version, TESTCASE_SCHEMA_V1);
        assert_eq!(parsed.entry, "intro");
        assert_eq!(parsed.expected_events.len(), 1);
    }

    #[test]
    fn read_test_case_reports_read_parse_and_schema_errors() {
        let root = temp_dir("case-errors");
        fs::create_dir_all(&root).expect("root should be created");

        let error = read_test_case(&root.join("missing.json")).expect_err("missing case");
        assert!(matches!(error, AdvToolError::ReadFile { .. }));

        let bad_json_path = root.join("bad.json");
        write_file(&bad_json_path, "{");
        let parse_error = read_test_case(&bad_json_path).expect_err("parse should fail");
        assert!(matches!(parse_error, AdvToolError::ParseCase { .. }));

        let bad_schema_path = root.join("bad-schema.json");
        write_file(
            &bad_schema_path,
            r#"{"schemaVersion":"adv-tool-case.v0","actions":[],"expectedEvents":[]}"#,
        );
        let schema_error = read_test_case(&bad_schema_path).expect_err("schema should fail");
        assert!(matches!(
            schema_error,
            AdvToolError::InvalidSchemaVersion { .. }
        ));
    }
}
