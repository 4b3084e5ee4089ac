use std::path::{Path, PathBuf};

/// Prefixes a report line with four spaces per level and a `# ` marker.
pub fn indent(line: &str, level: usize) -> String {
    format!("{}# {line}", " ".repeat(level * 4))
}

/// Hidden `.<name>.tmp` next to `path`, renamed over it once fully written.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    path.with_file_name(format!(".{file_name}.tmp"))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn indent_adds_four_spaces_per_level() {
        assert_eq!(indent("hello", 0), "# hello");
        assert_eq!(indent("hello", 1), "    # hello");
        assert_eq!(indent("hello", 2), "        # hello");
    }

    #[test]
    fn temp_sibling_stays_in_the_same_folder() {
        assert_eq!(
            temp_sibling(Path::new("/out/Game.chd")),
            PathBuf::from("/out/.Game.chd.tmp")
        );
    }
}
