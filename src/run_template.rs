//! Launch-command inference: first matching framework heuristic wins, README
//! run hints are the weak fallback.

use crate::models::{FileRecord, RunTemplate};

pub fn infer_run_template(files: &[FileRecord]) -> RunTemplate {
    for file in files {
        let Some(text) = file.content.as_text() else {
            continue;
        };
        let lower = text.to_lowercase();

        if lower.contains("uvicorn") && lower.contains("app") {
            return RunTemplate {
                cmd: Some("uvicorn main:app --host 0.0.0.0 --port 8000".to_string()),
                confidence: 0.85,
                evidence: vec![format!("uvicorn reference in {}", file.path)],
            };
        }
        if lower.contains("flask") && lower.contains("app.run(") {
            return RunTemplate {
                cmd: Some(format!("python {}", file.path)),
                confidence: 0.7,
                evidence: vec![format!("flask app.run found in {}", file.path)],
            };
        }
        if lower.contains("npm start") || file.path.ends_with("package.json") {
            return RunTemplate {
                cmd: Some("npm start".to_string()),
                confidence: 0.7,
                evidence: vec![format!("npm start or package.json ({})", file.path)],
            };
        }
    }

    // Fallback: a run-looking line from the README.
    for file in files {
        let name = file.path.rsplit('/').next().unwrap_or(&file.path);
        if !name.to_lowercase().starts_with("readme") {
            continue;
        }
        let Some(text) = file.content.as_text() else {
            continue;
        };
        for line in text.lines() {
            let lower = line.to_lowercase();
            if lower.contains("python") || lower.contains("run") {
                return RunTemplate {
                    cmd: Some(line.trim().to_string()),
                    confidence: 0.4,
                    evidence: vec![format!("readme run hint in {}", file.path)],
                };
            }
        }
    }

    RunTemplate::default()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileContent, SourceLanguage};

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            language: SourceLanguage::from_extension(
                path.rsplit('.').next().unwrap_or_default(),
            ),
            content: FileContent::Text(content.to_string()),
            size: content.len() as u64,
            content_hash: String::new(),
        }
    }

    #[test]
    fn test_uvicorn_wins() {
        let files = vec![record("main.py", "import uvicorn\nuvicorn.run(app)\n")];
        let t = infer_run_template(&files);
        assert_eq!(t.cmd.as_deref(), Some("uvicorn main:app --host 0.0.0.0 --port 8000"));
        assert_eq!(t.confidence, 0.85);
    }

    #[test]
    fn test_flask_app_run() {
        let files = vec![record("app.py", "from flask import Flask\napp.run(port=80)\n")];
        let t = infer_run_template(&files);
        assert_eq!(t.cmd.as_deref(), Some("python app.py"));
    }

    #[test]
    fn test_readme_fallback() {
        let files = vec![record("README.md", "# demo\n\nrun with: python demo.py\n")];
        let t = infer_run_template(&files);
        assert_eq!(t.confidence, 0.4);
        assert_eq!(t.cmd.as_deref(), Some("run with: python demo.py"));
    }

    #[test]
    fn test_no_hint() {
        let files = vec![record("lib.py", "def f():\n    pass\n")];
        let t = infer_run_template(&files);
        assert!(t.cmd.is_none());
        assert_eq!(t.confidence, 0.0);
    }
}
