//! Reading label files back

use std::path::{Path, PathBuf};

use crate::annotation::NormalizedAnnotation;

/// Label reading errors
#[derive(thiserror::Error, Debug)]
pub enum LabelError {
    /// IO error
    #[error("IO error reading {path}: {source}")]
    Io {
        /// Label file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A line is not `class_id cx cy w h`
    #[error("{path}:{line}: {message}")]
    Parse {
        /// Label file
        path: PathBuf,
        /// One-based line number
        line: usize,
        /// What is wrong with the line
        message: String,
    },
}

fn parse_field(raw: &str, name: &str, path: &Path, line: usize) -> Result<f64, LabelError> {
    raw.parse::<f64>().map_err(|_| LabelError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("invalid {name} '{raw}'"),
    })
}

fn parse_line(text: &str, path: &Path, line: usize) -> Result<Option<NormalizedAnnotation>, LabelError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();
    if tokens.len() != 5 {
        return Err(LabelError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("expected 5 fields, found {}", tokens.len()),
        });
    }

    let class_id = tokens[0].parse::<u32>().map_err(|_| LabelError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("invalid class_id '{}'", tokens[0]),
    })?;

    Ok(Some(NormalizedAnnotation {
        class_id,
        x_center: parse_field(tokens[1], "x_center", path, line)?,
        y_center: parse_field(tokens[2], "y_center", path, line)?,
        width: parse_field(tokens[3], "width", path, line)?,
        height: parse_field(tokens[4], "height", path, line)?,
    }))
}

/// Parse label text; `path` is only used in error messages
pub fn parse_label(contents: &str, path: &Path) -> Result<Vec<NormalizedAnnotation>, LabelError> {
    let mut annotations = Vec::new();
    for (index, text) in contents.lines().enumerate() {
        if let Some(annotation) = parse_line(text, path, index + 1)? {
            annotations.push(annotation);
        }
    }
    Ok(annotations)
}

/// Read and parse a label file
pub fn read_label(path: &Path) -> Result<Vec<NormalizedAnnotation>, LabelError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_label(&contents, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{write_label, EncodeOutcome, ObjectAnnotation};
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_skips_blank_lines() {
        let parsed = parse_label("0 0.5 0.5 0.35 0.1\n\n  \n1 0.25 0.75 0.1 0.2\n", Path::new("a.txt"))
            .expect("valid label");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].class_id, 1);
        assert_relative_eq!(parsed[1].y_center, 0.75);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse_label("0 0.5 0.5 0.35 0.1\n0 0.5 nope 0.1 0.1\n", Path::new("a.txt"))
            .expect_err("second line is invalid");
        assert!(matches!(err, LabelError::Parse { line: 2, .. }));

        let err = parse_label("0 0.5 0.5\n", Path::new("a.txt")).expect_err("too few fields");
        assert!(matches!(err, LabelError::Parse { line: 1, .. }));

        let err = parse_label("-1 0.5 0.5 0.1 0.1\n", Path::new("a.txt")).expect_err("negative class");
        assert!(err.to_string().contains("class_id"));
    }

    #[test]
    fn test_reads_what_the_writer_wrote() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("frame_0000.txt");
        let annotation = NormalizedAnnotation {
            class_id: 4,
            x_center: 0.123456,
            y_center: 0.654321,
            width: 0.2,
            height: 0.05,
        };
        write_label(
            &path,
            &[ObjectAnnotation { class_id: 4, outcome: EncodeOutcome::Accepted(annotation) }],
        )
        .expect("write label");

        let read = read_label(&path).expect("read label");
        assert_eq!(read, vec![annotation]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_label(Path::new("/definitely/not/here.txt")).expect_err("missing file");
        assert!(matches!(err, LabelError::Io { .. }));
    }
}
