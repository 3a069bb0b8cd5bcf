use super::structures::ABSENT_FIELD;

/// Join the three directory tree levels into a forward-slash path.
///
/// A field equal to the single-space placeholder counts as absent. Separators
/// inside `path` are taken as encoded by the archive.
pub fn build_virtual_path(extension: &str, path: &str, filename: &str) -> String {
    let present = |field: &str| field != ABSENT_FIELD && !field.is_empty();

    let mut full = String::with_capacity(path.len() + filename.len() + extension.len() + 2);
    if present(path) {
        full.push_str(path);
        full.push('/');
    }
    if present(filename) {
        full.push_str(filename);
    }
    if present(extension) {
        full.push('.');
        full.push_str(extension);
    }
    full
}
