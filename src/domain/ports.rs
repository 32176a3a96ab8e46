/// Source of the current time for request defaults and acknowledgements.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> i64;
}
