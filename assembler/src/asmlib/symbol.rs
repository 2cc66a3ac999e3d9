use std::fmt::{self, Display, Formatter};

/// The name of a label, macro or macro argument.  Names are
/// case-sensitive; only the built-in register names are not.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolName {
    text: String,
}

impl SymbolName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

impl From<String> for SymbolName {
    fn from(s: String) -> SymbolName {
        SymbolName { text: s }
    }
}

impl From<&str> for SymbolName {
    fn from(s: &str) -> SymbolName {
        SymbolName::from(s.to_string())
    }
}

impl Display for SymbolName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.text, f)
    }
}

impl PartialEq<str> for SymbolName {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}
