use std::path::Path;

const CSV_SUFFIX: &str = ".csv";
const HIDDEN_MARKER: char = '.';

pub trait PathExt {
    fn is_csv_file(&self) -> bool;
    fn is_hidden(&self) -> bool;
    fn csv_stem(&self) -> Option<&str>;
    fn cluster_name(&self) -> String;
    fn file_name_lossy(&self) -> String;
}

impl PathExt for Path {
    fn is_csv_file(&self) -> bool {
        self.csv_stem().is_some()
    }

    fn is_hidden(&self) -> bool {
        self.file_name()
            .map(|n| n.to_string_lossy().starts_with(HIDDEN_MARKER))
            .unwrap_or(false)
    }

    /// File name with the `.csv` suffix removed; `None` for any other file.
    fn csv_stem(&self) -> Option<&str> {
        self.file_name()?.to_str()?.strip_suffix(CSV_SUFFIX)
    }

    fn cluster_name(&self) -> String {
        match self.csv_stem() {
            Some(stem) => stem.to_string(),
            None => self
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    fn file_name_lossy(&self) -> String {
        self.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
