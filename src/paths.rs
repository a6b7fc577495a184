//! Output file names derived from the input name.

use std::path::{Path, PathBuf};

/// Suffix appended to the stem of an encoded file.
pub const ENCODED_SUFFIX: &str = "_encoded.txt";
/// Suffix appended to the stem of a decoded file.
pub const DECODED_SUFFIX: &str = "_decoded.txt";

/// The input path with its file name cut at the last '.'.
///
/// Names without a '.' are returned unchanged. A name whose only '.' leads
/// it (`.profile`) has an empty stem, so only the directory part is left.
pub fn stem(path: &Path) -> PathBuf {
    let Some(name) = path.file_name() else {
        return path.to_path_buf();
    };
    let name = name.to_string_lossy();
    match stem_of(&name) {
        "" => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        stem => path.with_file_name(stem),
    }
}

fn stem_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(index) => &name[..index],
        None => name,
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{}{}", stem_of(&name.to_string_lossy()), suffix)),
        None => {
            let mut name = path.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        }
    }
}

pub fn encoded_path(path: &Path) -> PathBuf {
    with_suffix(path, ENCODED_SUFFIX)
}

pub fn decoded_path(path: &Path) -> PathBuf {
    with_suffix(path, DECODED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_cuts_at_last_dot() {
        assert_eq!(stem(Path::new("lorem.txt")), PathBuf::from("lorem"));
        assert_eq!(stem(Path::new("archive.tar.gz")), PathBuf::from("archive.tar"));
        assert_eq!(stem(Path::new("README")), PathBuf::from("README"));
    }

    #[test]
    fn test_leading_dot_name_has_empty_stem() {
        assert_eq!(stem(Path::new(".profile")), PathBuf::from(""));
        assert_eq!(stem(Path::new("home/.profile")), PathBuf::from("home"));
        assert_eq!(encoded_path(Path::new(".profile")), PathBuf::from("_encoded.txt"));
        assert_eq!(decoded_path(Path::new("home/.profile")), PathBuf::from("home/_decoded.txt"));
    }

    #[test]
    fn test_stem_ignores_dots_in_directories() {
        assert_eq!(stem(Path::new("data.v2/notes")), PathBuf::from("data.v2/notes"));
        assert_eq!(stem(Path::new("data.v2/notes.md")), PathBuf::from("data.v2/notes"));
    }

    #[test]
    fn test_output_names() {
        let input = Path::new("texts/lorem.txt");
        assert_eq!(encoded_path(input), PathBuf::from("texts/lorem_encoded.txt"));
        assert_eq!(decoded_path(input), PathBuf::from("texts/lorem_decoded.txt"));

        let encoded = encoded_path(input);
        assert_eq!(decoded_path(&encoded), PathBuf::from("texts/lorem_encoded_decoded.txt"));
    }
}
