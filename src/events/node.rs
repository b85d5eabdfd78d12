#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    Running,
    Succeeded,
    Failed(Option<String>),
    Rearmed,
}
