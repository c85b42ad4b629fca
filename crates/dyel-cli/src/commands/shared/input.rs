use std::io::Read;

use anyhow::Context;
use dyel_core::ProgramDraft;

/// Read a program draft from a file path, or from stdin when `file` is `-`.
pub fn read_draft(file: &str) -> anyhow::Result<ProgramDraft> {
    let text = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read program JSON from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?
    };
    parse_draft(&text, file)
}

fn parse_draft(text: &str, source: &str) -> anyhow::Result<ProgramDraft> {
    let source = if source == "-" { "stdin" } else { source };
    serde_json::from_str(text).with_context(|| format!("invalid program JSON in {source}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_draft_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"Leg Day","shared_by":"alice","days":[{{"name":"Monday"}}]}}"#
        )
        .unwrap();

        let draft = read_draft(file.path().to_str().unwrap()).unwrap();
        assert_eq!(draft.name, "Leg Day");
        assert_eq!(draft.days.len(), 1);
        assert_eq!(draft.id, None);
    }

    #[test]
    fn malformed_json_names_its_source() {
        let err = parse_draft("{", "-").unwrap_err();
        assert!(err.to_string().contains("stdin"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_draft("/nonexistent/program.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/program.json"));
    }
}
