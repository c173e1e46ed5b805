use super::*;
use std::io::Write;
use tempfile::TempDir;

const LIFE_TABLE: &str = "\
| Age(x) | l_x | q_x |
| --- | --- | --- |
| 20 | 99000 | 0.0012 |
| 21 | 98881 | 0.0013 |
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

// =========================================================================
// format_cell Tests
// =========================================================================

#[test]
fn test_format_cell_missing() {
    assert_eq!(format_cell(None), "NA");
}

#[test]
fn test_format_cell_short_text_unchanged() {
    assert_eq!(format_cell(Some("0.0012".to_string())), "0.0012");
}

#[test]
fn test_format_cell_truncates_long_text() {
    let long = "x".repeat(40);
    let cell = format_cell(Some(long));
    assert_eq!(cell.chars().count(), MAX_PREVIEW_WIDTH);
    assert!(cell.ends_with('…'));
}

// =========================================================================
// build_type_spec Tests
// =========================================================================

#[test]
fn test_build_type_spec_pairs_only() {
    let spec = build_type_spec(None, &["l_x=integer".to_string()]).unwrap();
    assert_eq!(spec.iter().collect::<Vec<_>>(), vec![("l_x", "integer")]);
}

#[test]
fn test_build_type_spec_file_then_pairs() {
    let dir = TempDir::new().unwrap();
    let types = write_file(&dir, "types.yaml", "Age(x): integer\nq_x: numeric\n");

    let spec = build_type_spec(Some(&types), &["l_x=integer".to_string()]).unwrap();
    assert_eq!(
        spec.iter().collect::<Vec<_>>(),
        vec![("Age(x)", "integer"), ("q_x", "numeric"), ("l_x", "integer")]
    );
}

#[test]
fn test_build_type_spec_bad_pair_is_fatal() {
    let result = build_type_spec(None, &["l_x".to_string()]);
    assert!(matches!(
        result,
        Err(crate::error::ConvertError::TypeSpec(_))
    ));
}

#[test]
fn test_build_type_spec_missing_file() {
    let result = build_type_spec(Some(Path::new("/nonexistent/types.yaml")), &[]);
    assert!(matches!(result, Err(crate::error::ConvertError::Io(_))));
}

// =========================================================================
// Command Tests
// =========================================================================

#[test]
fn test_convert_writes_workbook() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "life.md", LIFE_TABLE);
    let base = dir.path().join("life");

    let spec = build_type_spec(None, &["Age(x)=integer".to_string()]).unwrap();
    convert(input, base.clone(), spec, ConvertOptions::default(), true, false).unwrap();

    assert!(dir.path().join("life.xlsx").exists());
}

#[test]
fn test_convert_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let result = convert(
        dir.path().join("nope.md"),
        dir.path().join("out"),
        TypeSpec::new(),
        ConvertOptions::default(),
        false,
        false,
    );
    assert!(result.is_err());
    assert!(!dir.path().join("out.xlsx").exists());
}

#[test]
fn test_preview_text_and_json() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "life.md", LIFE_TABLE);
    let spec = build_type_spec(None, &["q_x=numeric".to_string(), "x=date".to_string()]).unwrap();

    assert!(preview(input.clone(), spec.clone(), ConvertOptions::default(), false).is_ok());
    assert!(preview(input, spec, ConvertOptions::default(), true).is_ok());
}

#[test]
fn test_types_command() {
    assert!(types().is_ok());
}
