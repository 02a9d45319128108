use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::palette;

pub const DEFAULT_TEXT: &str = "rc3";
pub const DEFAULT_INTERVAL_SECS: u32 = 5;
pub const MAX_INTERVAL_SECS: u32 = 600;

/// RFC 3986 unreserved characters pass through, everything else is escaped.
const FRAGMENT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The resolved parameter triple. `text` keeps the raw value as supplied;
/// truncation and casing happen at layout time so the canonical fragment
/// round-trips what the user wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub palette: usize,
    pub interval_secs: u32,
    pub text: String,
}

impl Params {
    /// Parse a fragment string (`key=value` pairs joined by `&`, values
    /// percent-encoded, optional leading `#`). Unknown keys are ignored and
    /// malformed values fall back silently:
    /// `color` outside [0,2] -> 0, `interval` outside [0,600] -> 5, missing
    /// `text` -> `last_text`.
    pub fn parse(fragment: &str, last_text: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        let mut text: Option<String> = None;
        let mut color: Option<i64> = None;
        let mut interval: Option<i64> = None;

        for pair in fragment.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = percent_decode_str(value).decode_utf8_lossy().into_owned();
            match key {
                "text" => text = Some(value),
                "color" => color = value.parse().ok(),
                "interval" => interval = value.parse().ok(),
                _ => {}
            }
        }

        let interval_secs = match interval {
            Some(value) if value >= 0 && value <= i64::from(MAX_INTERVAL_SECS) => value as u32,
            _ => DEFAULT_INTERVAL_SECS,
        };

        Self {
            palette: palette::clamp_palette_index(color),
            interval_secs,
            text: text.unwrap_or_else(|| last_text.to_owned()),
        }
    }

    /// The canonical write-back form. Always carries all three keys, so
    /// defaults round-trip even when absent from the input.
    pub fn canonical_fragment(&self) -> String {
        format!(
            "color={}&interval={}&text={}",
            self.palette,
            self.interval_secs,
            utf8_percent_encode(&self.text, FRAGMENT_ENCODE)
        )
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            palette: 0,
            interval_secs: DEFAULT_INTERVAL_SECS,
            text: DEFAULT_TEXT.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Params, DEFAULT_TEXT};

    #[test]
    fn round_trips_a_fully_specified_fragment() {
        let params = Params::parse("color=1&interval=0&text=Hi", DEFAULT_TEXT);
        assert_eq!(params.palette, 1);
        assert_eq!(params.interval_secs, 0);
        assert_eq!(params.text, "Hi");
        assert_eq!(params.canonical_fragment(), "color=1&interval=0&text=Hi");
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let params = Params::parse("color=9&interval=-1&text=X", DEFAULT_TEXT);
        assert_eq!(params.palette, 0);
        assert_eq!(params.interval_secs, 5);
        assert_eq!(params.text, "X");

        let params = Params::parse("color=abc&interval=601", DEFAULT_TEXT);
        assert_eq!(params.palette, 0);
        assert_eq!(params.interval_secs, 5);
    }

    #[test]
    fn missing_text_keeps_the_last_known_value() {
        let params = Params::parse("color=2", "previous");
        assert_eq!(params.text, "previous");
        assert_eq!(params.palette, 2);
        assert_eq!(params.interval_secs, 5);
    }

    #[test]
    fn empty_fragment_resolves_all_defaults() {
        let params = Params::parse("", DEFAULT_TEXT);
        assert_eq!(params, Params::default());
        assert_eq!(params.canonical_fragment(), "color=0&interval=5&text=rc3");
    }

    #[test]
    fn percent_decoding_and_reencoding() {
        let params = Params::parse("#text=f%C3%BCnf%20w%C3%B6rter", DEFAULT_TEXT);
        assert_eq!(params.text, "fünf wörter");
        assert_eq!(
            params.canonical_fragment(),
            "color=0&interval=5&text=f%C3%BCnf%20w%C3%B6rter"
        );
    }

    #[test]
    fn unknown_keys_and_bare_tokens_are_ignored() {
        let params = Params::parse("junk&mode=7&color=1", DEFAULT_TEXT);
        assert_eq!(params.palette, 1);
        assert_eq!(params.text, DEFAULT_TEXT);
    }

    #[test]
    fn value_splits_on_first_equals_only() {
        let params = Params::parse("text=a%3Db=c", DEFAULT_TEXT);
        assert_eq!(params.text, "a=b=c");
    }
}
