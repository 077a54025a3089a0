#[derive(Clone, Debug, Default)]
pub struct Config {
    pub context: Option<String>,
    pub namespace: Option<String>,
}

impl Config {
    pub fn new(context: Option<String>, namespace: Option<String>) -> Self {
        Self { context, namespace }
    }
}
