//! The AIPS monograph record and its parsed registration-number list.

/// One monograph record, as read from the AIPS corpus.
///
/// `regnrs` preserves the upstream comma/space-separated string verbatim
/// (bound to the `regnrs` output column as-is); `regnr_list` is the same
/// value split and padded, used for every cross-source lookup.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Medicine {
    pub title: String,
    pub auth: String,
    pub atc: String,
    pub substance: String,
    pub regnrs: String,
    #[serde(skip)]
    pub regnr_list: Vec<String>,
    pub content_xml: String,
}

impl Medicine {
    pub fn new(title: String, auth: String, atc: String, substance: String, regnrs: String, content_xml: String) -> Self {
        let regnr_list = split_regnrs(&regnrs);
        Self {
            title,
            auth,
            atc,
            substance,
            regnrs,
            regnr_list,
            content_xml,
        }
    }

    pub fn first_regnr(&self) -> Option<&str> {
        self.regnr_list.first().map(String::as_str)
    }
}

/// Splits a `regnrs` field on commas and/or whitespace, matching the
/// upstream `boost::is_any_of(", ")` / `token_compress_on` split, then pads
/// each piece to 5 digits.
pub fn split_regnrs(regnrs: &str) -> Vec<String> {
    regnrs
        .split([',', ' '])
        .filter(|s| !s.is_empty())
        .map(|s| crate::gtin::pad(5, s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_pads_comma_separated_regnrs() {
        assert_eq!(split_regnrs("123, 456"), vec!["00123", "00456"]);
    }

    #[test]
    fn collapses_repeated_separators() {
        assert_eq!(split_regnrs("123,,  456"), vec!["00123", "00456"]);
    }

    #[test]
    fn first_regnr_returns_padded_value() {
        let m = Medicine::new(
            "Title".into(),
            "Auth".into(),
            "J01".into(),
            "Subst".into(),
            "42".into(),
            "<div/>".into(),
        );
        assert_eq!(m.first_regnr(), Some("00042"));
    }
}
