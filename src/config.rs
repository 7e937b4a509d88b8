//! Fixed configuration tables: remote store location, cache naming, the
//! always-present field set, and the well-known organization batch.
//!
//! Everything here is immutable data constructed once at startup and passed
//! explicitly to the report assembler — no process-wide mutable state.

use crate::fields::FieldDef;

/// Base URL of the public IRS e-file object store.
pub const BASE_URL: &str = "https://s3.amazonaws.com/irs-form-990/";

/// Suffix appended to an object id to form both the remote key and the
/// cached filename.
pub const DOC_SUFFIX: &str = "_public.xml";

/// Bulk index files are named `index_<year>.csv` (pre-downloaded, read-only).
pub const INDEX_PREFIX: &str = "index_";
pub const INDEX_EXT: &str = ".csv";

/// Well-known organizations available as a fixed batch via `--known`.
/// EIN (digits only) → display name.
pub const KNOWN_ORGS: &[(&str, &str)] = &[
    ("530196605", "American National Red Cross"),
    ("131635294", "United Way Worldwide"),
    ("363673599", "Feeding America"),
    ("911914868", "Habitat for Humanity International"),
    ("620646012", "ALSAC - St. Jude Children's Research Hospital"),
    ("135562351", "The Salvation Army National Corporation"),
    ("363258696", "YMCA of the USA"),
    ("530196517", "Goodwill Industries International"),
];

/// The fixed always-present fields, each with its path alternatives across
/// schema generations (2013+ `*Txt`/`*Cd`/`*Amt` names first, then the older
/// spellings). Merged ahead of any caller-supplied fields.
pub fn default_fields() -> Vec<FieldDef> {
    vec![
        FieldDef::new("EIN", &["/Return/ReturnHeader/Filer/EIN"]),
        FieldDef::new(
            "Organization",
            &[
                "/Return/ReturnHeader/Filer/BusinessName/BusinessNameLine1Txt",
                "/Return/ReturnHeader/Filer/Name/BusinessNameLine1",
            ],
        ),
        FieldDef::new(
            "Tax Year",
            &["/Return/ReturnHeader/TaxYr", "/Return/ReturnHeader/TaxYear"],
        ),
        FieldDef::new(
            "Tax Period End",
            &[
                "/Return/ReturnHeader/TaxPeriodEndDt",
                "/Return/ReturnHeader/TaxPeriodEndDate",
            ],
        ),
        FieldDef::new(
            "Return Type",
            &[
                "/Return/ReturnHeader/ReturnTypeCd",
                "/Return/ReturnHeader/ReturnType",
            ],
        ),
        FieldDef::new(
            "Total Revenue",
            &[
                "/Return/ReturnData/IRS990/CYTotalRevenueAmt",
                "/Return/ReturnData/IRS990/TotalRevenueCurrentYear",
                "/Return/ReturnData/IRS990EZ/TotalRevenueAmt",
                "/Return/ReturnData/IRS990EZ/TotalRevenue",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_https() {
        assert!(BASE_URL.starts_with("https://"));
        assert!(BASE_URL.ends_with('/'));
    }

    #[test]
    fn default_fields_start_with_ein() {
        let fields = default_fields();
        assert_eq!(fields[0].column, "EIN");
        assert!(!fields[0].paths.is_empty());
    }

    #[test]
    fn every_default_field_has_alternatives() {
        for field in default_fields() {
            assert!(!field.paths.is_empty(), "{} has no paths", field.column);
        }
    }

    #[test]
    fn known_org_eins_are_digits() {
        for (ein, name) in KNOWN_ORGS {
            assert!(ein.chars().all(|c| c.is_ascii_digit()), "{name}: {ein}");
            assert_eq!(ein.len(), 9);
        }
    }
}
