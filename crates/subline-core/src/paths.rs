use std::path::{Path, PathBuf};

pub const SUBLINE_DIR: &str = ".subline";
pub const CONFIG_FILE: &str = ".subline/config.yaml";

pub fn subline_dir(root: &Path) -> PathBuf {
    root.join(SUBLINE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Database location; `db_file` is relative to `.subline/` unless absolute.
pub fn db_path(root: &Path, db_file: &str) -> PathBuf {
    let file = Path::new(db_file);
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        subline_dir(root).join(file)
    }
}
