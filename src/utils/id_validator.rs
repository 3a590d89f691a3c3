//! 短 id 校验
//!
//! id 由客户端生成，服务端只校验形状。严格模式要求不透明 token 形状
//! `[A-Za-z0-9_-]{1,max}`；宽松模式接受任意能放进一个路径段的字符串。

use crate::config::ValidationConfig;

#[derive(Debug, PartialEq, Eq)]
pub enum IdValidationError {
    Empty,
    TooLong { max: usize },
    InvalidCharacter(char),
}

impl std::fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "id cannot be empty"),
            Self::TooLong { max } => write!(f, "id is longer than {} characters", max),
            Self::InvalidCharacter(c) => write!(f, "id contains invalid character {:?}", c),
        }
    }
}

impl std::error::Error for IdValidationError {}

/// 严格模式下的 token 字符集
#[inline]
pub fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// 默认策略下的快速判断（严格模式，最长 64）
pub fn is_valid_short_code(id: &str) -> bool {
    IdPolicy::default().validate(id).is_ok()
}

#[derive(Debug, Clone, Copy)]
pub struct IdPolicy {
    pub strict: bool,
    pub max_length: usize,
}

impl Default for IdPolicy {
    fn default() -> Self {
        Self {
            strict: true,
            max_length: crate::config::MAX_ID_COLUMN_LENGTH,
        }
    }
}

impl From<&ValidationConfig> for IdPolicy {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            strict: config.strict_ids,
            max_length: config.max_id_length,
        }
    }
}

impl IdPolicy {
    pub fn validate(&self, id: &str) -> Result<(), IdValidationError> {
        if id.is_empty() {
            return Err(IdValidationError::Empty);
        }
        if id.chars().count() > self.max_length {
            return Err(IdValidationError::TooLong {
                max: self.max_length,
            });
        }

        let bad = if self.strict {
            id.chars().find(|c| !is_token_char(*c))
        } else {
            id.chars()
                .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
        };

        match bad {
            Some(c) => Err(IdValidationError::InvalidCharacter(c)),
            None => Ok(()),
        }
    }
}
