/// Canonical comparison key for a suite or section name.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
