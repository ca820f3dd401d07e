use thiserror::Error;

#[derive(Error, Debug)]
pub enum MacroError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No such stat: '{0}'")]
    NoSuchStat(String),

    #[error("No such stat index: {0}")]
    NoSuchStatIndex(usize),

    #[error("Unknown skill: '{0}'")]
    UnknownSkill(String),

    #[error("Skill '{skill}' has no level {level}")]
    UnknownSkillLevel { skill: String, level: u32 },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Preset Validation Error: {0}")]
    Validation(String),

    #[error("Runtime Error: {0}")]
    Runtime(String),
}

pub type MacroResult<T> = Result<T, MacroError>;
