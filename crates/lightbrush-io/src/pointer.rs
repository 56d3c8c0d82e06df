//! Small single-value files edited by operators while the service runs.

use crate::error::{IoError, Result};
use std::path::{Path, PathBuf};

fn read_first_line(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(text.lines().next().unwrap_or_default().trim().to_string())
}

/// Read the indirection file and return the trajectory path it names.
///
/// Relative targets are resolved against the indirection file's directory.
pub fn read_current_file(path: &Path) -> Result<PathBuf> {
    let line = read_first_line(path)?;
    if line.is_empty() {
        return Err(IoError::Malformed(format!(
            "{} does not name a trajectory file",
            path.display()
        )));
    }

    let target = PathBuf::from(line);
    if target.is_absolute() {
        return Ok(target);
    }
    Ok(match path.parent() {
        Some(dir) => dir.join(target),
        None => target,
    })
}

/// Read the brightness multiplier from the first line of `path`.
pub fn read_multiplier(path: &Path) -> Result<f64> {
    let line = read_first_line(path)?;
    let value: f64 = line
        .parse()
        .map_err(|_| IoError::InvalidMultiplier(format!("{:?} in {}", line, path.display())))?;
    if !value.is_finite() {
        return Err(IoError::InvalidMultiplier(format!(
            "{} in {} is not finite",
            value,
            path.display()
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_multiplier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current_multiplier.txt");

        std::fs::write(&path, "0.5\nignored\n").unwrap();
        assert_eq!(read_multiplier(&path).unwrap(), 0.5);

        std::fs::write(&path, "  1.25  ").unwrap();
        assert_eq!(read_multiplier(&path).unwrap(), 1.25);

        std::fs::write(&path, "bright").unwrap();
        assert!(matches!(
            read_multiplier(&path),
            Err(IoError::InvalidMultiplier(_))
        ));

        std::fs::write(&path, "NaN").unwrap();
        assert!(matches!(
            read_multiplier(&path),
            Err(IoError::InvalidMultiplier(_))
        ));
    }

    #[test]
    fn test_read_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("current_file.txt");

        std::fs::write(&path, "paths/flower_execution.json\n").unwrap();
        assert_eq!(
            read_current_file(&path).unwrap(),
            dir.path().join("paths/flower_execution.json")
        );

        std::fs::write(&path, "/srv/lightbrush/a.json").unwrap();
        assert_eq!(
            read_current_file(&path).unwrap(),
            PathBuf::from("/srv/lightbrush/a.json")
        );

        std::fs::write(&path, "\n").unwrap();
        assert!(matches!(read_current_file(&path), Err(IoError::Malformed(_))));
    }

    #[test]
    fn test_missing_files() {
        let path = Path::new("/nonexistent/current_file.txt");
        assert!(matches!(read_current_file(path), Err(IoError::NotFound(_))));
        assert!(matches!(read_multiplier(path), Err(IoError::NotFound(_))));
    }
}
