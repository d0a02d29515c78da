use std::fmt;
use std::str::FromStr;

/// C# language version of the embedded code; gates newer lexical forms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CSharpLanguageVersion {
    CSharp7_3,
    CSharp8,
    CSharp9,
    CSharp10,
    CSharp11,
    CSharp12,
    #[default]
    Latest,
    Preview,
}

impl CSharpLanguageVersion {
    /// `"""raw"""` strings and the `u8` suffix.
    pub fn supports_raw_strings(self) -> bool {
        self >= Self::CSharp11
    }

    pub fn supports_utf8_strings(self) -> bool {
        self >= Self::CSharp11
    }

    pub fn supports_await_foreach(self) -> bool {
        self >= Self::CSharp8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown C# language version `{0}`")]
pub struct ParseLanguageVersionError(String);

impl FromStr for CSharpLanguageVersion {
    type Err = ParseLanguageVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "7.3" => Self::CSharp7_3,
            "8" | "8.0" => Self::CSharp8,
            "9" | "9.0" => Self::CSharp9,
            "10" | "10.0" => Self::CSharp10,
            "11" | "11.0" => Self::CSharp11,
            "12" | "12.0" => Self::CSharp12,
            "latest" | "latestmajor" | "default" => Self::Latest,
            "preview" => Self::Preview,
            _ => return Err(ParseLanguageVersionError(s.to_owned())),
        })
    }
}

impl fmt::Display for CSharpLanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CSharp7_3 => "7.3",
            Self::CSharp8 => "8.0",
            Self::CSharp9 => "9.0",
            Self::CSharp10 => "10.0",
            Self::CSharp11 => "11.0",
            Self::CSharp12 => "12.0",
            Self::Latest => "latest",
            Self::Preview => "preview",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_versions() {
        assert_eq!("8".parse(), Ok(CSharpLanguageVersion::CSharp8));
        assert_eq!("Preview".parse(), Ok(CSharpLanguageVersion::Preview));
        assert!("6".parse::<CSharpLanguageVersion>().is_err());
        assert!(!CSharpLanguageVersion::CSharp10.supports_raw_strings());
        assert!(CSharpLanguageVersion::Latest.supports_raw_strings());
        assert!(!CSharpLanguageVersion::CSharp7_3.supports_await_foreach());
    }
}
