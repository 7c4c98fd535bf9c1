use std::fmt::Display;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Local,
    Staging,
    Production,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stage = match self {
            Stage::Local => "local",
            Stage::Staging => "staging",
            Stage::Production => "production",
        };
        write!(f, "{}", stage)
    }
}

impl TryFrom<&str> for Stage {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Stage::Local),
            "staging" => Ok(Stage::Staging),
            "production" => Ok(Stage::Production),
            _ => Err(anyhow::anyhow!("unknown stage: {}", value)),
        }
    }
}
