use std::collections::BTreeMap;

/// A parsed but not yet validated question block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub question: String,
    pub choices: BTreeMap<char, String>,
    pub answer_letter: Option<char>,
    pub explanation: Option<String>,
}

impl RawCandidate {
    /// Choice texts in letter order.
    pub fn ordered_choices(&self) -> Vec<&str> {
        self.choices.values().map(String::as_str).collect()
    }
}
