#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    Running,
    Succeeded,
    Failed,
}
