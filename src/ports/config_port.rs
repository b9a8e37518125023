//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// All section names, sorted.
    fn sections(&self) -> Vec<String>;

    /// All keys in `section`, sorted. Empty when the section does not exist.
    fn keys(&self, section: &str) -> Vec<String>;
}
