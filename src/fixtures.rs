//! Fixture-driven test cases: `tests/programs/<case>/` directories each
//! hold a `program.py` plus a `case.yaml` describing the expected
//! front-end outcome.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseClass {
    AnalysisSuccess,
    FrontendError,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpectedOutcome {
    /// Substring of the diagnostic, for `frontend_error` cases.
    pub error_contains: Option<String>,
    /// Fixture file holding the expected indented tree dump.
    pub tree_file: Option<String>,
    /// Fixture file holding the expected symbol table, one
    /// tab-separated `id name type scope` line per record.
    pub symbols_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CaseSpec {
    pub class: CaseClass,
    pub expected: ExpectedOutcome,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: String,
    pub dir: PathBuf,
    pub program_path: PathBuf,
    pub spec: CaseSpec,
}

impl Case {
    pub fn read_text(&self, relative_path: &str) -> Result<String> {
        let path = self.dir.join(relative_path);
        fs::read_to_string(&path)
            .with_context(|| format!("Case '{}': reading {}", self.name, path.display()))
    }
}

/// Collects every case directory under `programs_dir`, sorted by name.
/// Directories without a `case.yaml` are ignored.
pub fn load_cases(programs_dir: &Path) -> Result<Vec<Case>> {
    let entries = fs::read_dir(programs_dir)
        .with_context(|| format!("Listing fixture cases under {}", programs_dir.display()))?;

    let mut cases = Vec::new();
    for entry in entries {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }
        if let Some(case) = load_case(&dir)? {
            cases.push(case);
        }
    }

    ensure!(
        !cases.is_empty(),
        "{} holds no fixture cases",
        programs_dir.display()
    );
    cases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(cases)
}

fn load_case(dir: &Path) -> Result<Option<Case>> {
    let spec_path = dir.join("case.yaml");
    if !spec_path.exists() {
        return Ok(None);
    }
    let name = match dir.file_name().and_then(|os| os.to_str()) {
        Some(name) => name.to_string(),
        None => bail!("Fixture directory {} has a non-UTF-8 name", dir.display()),
    };

    let raw = fs::read_to_string(&spec_path)
        .with_context(|| format!("Reading case spec for '{name}'"))?;
    let spec: CaseSpec =
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing case spec for '{name}'"))?;

    let program_path = dir.join("program.py");
    ensure!(
        program_path.exists(),
        "Case '{name}' has a case.yaml but no program.py"
    );
    if spec.class == CaseClass::FrontendError {
        ensure!(
            spec.expected.error_contains.is_some(),
            "Case '{name}' expects a frontend error but names no error_contains substring"
        );
    }

    Ok(Some(Case {
        name,
        dir: dir.to_path_buf(),
        program_path,
        spec,
    }))
}
