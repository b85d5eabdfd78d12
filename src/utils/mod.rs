pub mod time;

/// Random identifier for a graph run.
pub fn longid() -> String {
    nanoid::nanoid!()
}
