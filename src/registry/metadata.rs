/// Declared property names of one node type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindMetadata {
    /// properties read by the handler
    pub inputs: Vec<String>,
    /// properties written by the handler and readable downstream
    pub outputs: Vec<String>,
    /// inputs that collect every active property-mapped edge into an array
    pub aggregated: Vec<String>,
}

impl KindMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs<I, S>(
        mut self,
        names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn outputs<I, S>(
        mut self,
        names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn aggregated<I, S>(
        mut self,
        names: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregated = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_aggregated(
        &self,
        property: &str,
    ) -> bool {
        self.aggregated.iter().any(|p| p == property)
    }

    /// Declared inputs followed by declared outputs, without duplicates.
    pub fn declared(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.inputs.iter().chain(self.outputs.iter()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}
