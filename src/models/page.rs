use serde::{Deserialize, Serialize};

/// Recognized text for one page of a submitted document.
///
/// The recognition client always yields a `Vec<PageResult>`, one entry per
/// page in the order the service returned them, even for single images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,

    #[serde(default)]
    pub text: String,

    /// Raw text annotation as returned by the service (blocks, lines, words).
    #[serde(
        rename = "textAnnotation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub annotation: Option<serde_json::Value>,
}

impl PageResult {
    pub fn new(page: Option<u64>, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
            annotation: None,
        }
    }

    /// Page number used in headers: the explicit one, else the 1-based position.
    pub fn number(&self, position: usize) -> u64 {
        self.page.unwrap_or(position as u64 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_falls_back_to_position() {
        assert_eq!(PageResult::new(Some(7), "x").number(0), 7);
        assert_eq!(PageResult::new(None, "x").number(2), 3);
    }
}
