//! Catalog of points of interest.
//!
//! The catalog body holds the celestial objects. Three reserved entries always
//! follow it, in this order: Home, Unpark, Park. Positions run over the body and
//! then the reserved entries, so for a catalog of `N` positions the reserved
//! entries sit at `N-3`, `N-2` and `N-1`.

use crate::coordinates::{Declination, RightAscension};
use crate::{PoiSelectorError, PoiSelectorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Polaris, epoch of date.
const POLARIS_RA_HOUR: u8 = 2;
const POLARIS_RA_MINUTE: u8 = 58;
const POLARIS_RA_SECOND: u8 = 51;

/// Number of entries that always trail the catalog body.
const RESERVED_ENTRIES: usize = 3;

/// One catalog slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name, first character conventionally a marker glyph.
    pub label: String,
    pub ra_hour: u8,
    pub ra_minute: u8,
    pub ra_second: u8,
    /// Signed degrees; the sign applies to minutes and seconds too.
    pub dec_degree: i16,
    pub dec_minute: u8,
    pub dec_second: u8,
}

impl CatalogEntry {
    pub fn new(label: &str, ra: (u8, u8, u8), dec: (i16, u8, u8)) -> Self {
        Self {
            label: label.to_owned(),
            ra_hour: ra.0,
            ra_minute: ra.1,
            ra_second: ra.2,
            dec_degree: dec.0,
            dec_minute: dec.1,
            dec_second: dec.2,
        }
    }

    pub fn right_ascension(&self) -> RightAscension {
        RightAscension::new(self.ra_hour, self.ra_minute, self.ra_second)
    }

    pub fn declination(&self) -> Declination {
        Declination::from_dms(self.dec_degree, self.dec_minute, self.dec_second)
    }

    fn validate(&self) -> PoiSelectorResult<()> {
        let fail = |reason: &str| -> PoiSelectorResult<()> {
            Err(PoiSelectorError::InvalidEntry(format!(
                "{:?}: {}",
                self.label, reason
            )))
        };
        if self.label.trim().is_empty() {
            return fail("label is empty");
        }
        if self.ra_hour > 23 {
            return fail("RA hour must be 0-23");
        }
        if self.ra_minute > 59 || self.ra_second > 59 {
            return fail("RA minute and second must be 0-59");
        }
        if !(-90..=90).contains(&self.dec_degree) {
            return fail("DEC degree must be -90..90");
        }
        if self.dec_minute > 59 || self.dec_second > 59 {
            return fail("DEC minute and second must be 0-59");
        }
        Ok(())
    }

    fn reserved(label: &str) -> Self {
        Self::new(label, (0, 0, 0), (90, 0, 0))
    }
}

/// What a catalog position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the catalog body.
    Body(usize),
    Home,
    Unpark,
    Park,
}

/// Ordered, immutable list of points of interest.
#[derive(Debug, Clone)]
pub struct Catalog {
    body: Vec<CatalogEntry>,
    home: CatalogEntry,
    unpark: CatalogEntry,
    park: CatalogEntry,
}

impl Catalog {
    /// Build a catalog from its body entries. The reserved entries are appended.
    pub fn new(body: Vec<CatalogEntry>) -> PoiSelectorResult<Self> {
        for entry in &body {
            entry.validate()?;
        }
        Ok(Self::with_reserved(body))
    }

    fn with_reserved(body: Vec<CatalogEntry>) -> Self {
        Self {
            body,
            home: CatalogEntry::reserved(">Home"),
            unpark: CatalogEntry::reserved(">Unpark"),
            park: CatalogEntry::reserved(">Park"),
        }
    }

    /// The compiled-in catalog.
    pub fn builtin() -> Self {
        let body = vec![
            CatalogEntry::new(
                ">Polaris",
                (POLARIS_RA_HOUR, POLARIS_RA_MINUTE, POLARIS_RA_SECOND),
                (89, 21, 6),
            ),
            CatalogEntry::new(">Small Magellanic Cloud", (0, 53, 26), (-72, 40, 35)),
            CatalogEntry::new(">Large Magellanic Cloud", (5, 23, 23), (-69, 44, 3)),
            CatalogEntry::new(">Eagle Nebula", (18, 20, 5), (-13, 47, 52)),
            CatalogEntry::new(">Crux", (12, 27, 52), (-63, 13, 29)),
            CatalogEntry::new(">Alpha Centauri", (14, 29, 35), (-62, 40, 20)),
            CatalogEntry::new(">Omega Centauri", (13, 26, 47), (-47, 28, 46)),
            CatalogEntry::new(">47 Tucanae", (0, 24, 5), (-72, 4, 53)),
            CatalogEntry::new(">Wishing Well Cluster", (11, 5, 39), (-58, 45, 10)),
            CatalogEntry::new(">Hamburger Galaxy", (13, 25, 27), (-43, 1, 8)),
            CatalogEntry::new(">Sculptor Galaxy", (0, 47, 33), (-25, 17, 19)),
            CatalogEntry::new(">Carina Nebula", (10, 45, 8), (-59, 52, 4)),
            CatalogEntry::new(">Tau Canis Majoris", (7, 18, 0), (-24, 57, 0)),
            CatalogEntry::new(">Eight-Burst Nebula", (10, 7, 1), (-40, 26, 11)),
            CatalogEntry::new(">M83 Southern Pinwheel", (13, 37, 0), (-29, 51, 57)),
            CatalogEntry::new(">M42 Orion Nebula", (5, 36, 18), (-5, 22, 44)),
        ];
        Self::with_reserved(body)
    }

    /// Parse a catalog body from a JSON array of entries.
    pub fn from_json(raw: &str) -> PoiSelectorResult<Self> {
        let body: Vec<CatalogEntry> =
            serde_json::from_str(raw).map_err(|e| PoiSelectorError::ParseError(e.to_string()))?;
        Self::new(body)
    }

    /// Load a catalog body from a JSON file.
    pub fn load(path: &Path) -> PoiSelectorResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PoiSelectorError::IoError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Total number of positions, reserved entries included.
    pub fn len(&self) -> usize {
        self.body.len() + RESERVED_ENTRIES
    }

    /// A catalog always holds the reserved entries.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn body(&self) -> &[CatalogEntry] {
        &self.body
    }

    pub fn park_index(&self) -> usize {
        self.len() - 1
    }

    pub fn unpark_index(&self) -> usize {
        self.len() - 2
    }

    pub fn home_index(&self) -> usize {
        self.len() - 3
    }

    /// Positions past the park index clamp to Park; callers keep the cursor in range.
    pub fn selection_at(&self, position: usize) -> Selection {
        if position < self.body.len() {
            Selection::Body(position)
        } else if position == self.home_index() {
            Selection::Home
        } else if position == self.unpark_index() {
            Selection::Unpark
        } else {
            Selection::Park
        }
    }

    pub fn position(&self, selection: Selection) -> usize {
        match selection {
            Selection::Body(index) => index,
            Selection::Home => self.home_index(),
            Selection::Unpark => self.unpark_index(),
            Selection::Park => self.park_index(),
        }
    }

    pub fn entry(&self, selection: Selection) -> &CatalogEntry {
        match selection {
            Selection::Body(index) => &self.body[index],
            Selection::Home => &self.home,
            Selection::Unpark => &self.unpark,
            Selection::Park => &self.park,
        }
    }

    pub fn entry_at(&self, position: usize) -> &CatalogEntry {
        self.entry(self.selection_at(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reserved_entries_trail_the_body() {
        let catalog = Catalog::builtin();
        let n = catalog.len();
        assert_eq!(n, catalog.body().len() + 3);
        assert_eq!(catalog.home_index(), n - 3);
        assert_eq!(catalog.unpark_index(), n - 2);
        assert_eq!(catalog.park_index(), n - 1);
        assert_eq!(catalog.entry_at(n - 3).label, ">Home");
        assert_eq!(catalog.entry_at(n - 2).label, ">Unpark");
        assert_eq!(catalog.entry_at(n - 1).label, ">Park");
        assert_eq!(catalog.entry_at(0).label, ">Polaris");
    }

    #[test]
    fn builtin_and_loaded_catalogs_share_reserved_entries() {
        let builtin = Catalog::builtin();
        let loaded = Catalog::from_json("[]").unwrap();
        for selection in [Selection::Home, Selection::Unpark, Selection::Park] {
            assert_eq!(builtin.entry(selection), loaded.entry(selection));
        }
    }

    #[test]
    fn selection_and_position_agree() {
        let catalog = Catalog::builtin();
        for position in 0..catalog.len() {
            let selection = catalog.selection_at(position);
            assert_eq!(catalog.position(selection), position);
        }
        assert_eq!(catalog.selection_at(catalog.home_index()), Selection::Home);
        assert_eq!(catalog.selection_at(1), Selection::Body(1));
    }

    #[test]
    fn empty_body_still_has_reserved_entries() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.selection_at(0), Selection::Home);
        assert_eq!(catalog.selection_at(2), Selection::Park);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let bad_ra = CatalogEntry::new(">Bad", (24, 0, 0), (0, 0, 0));
        assert!(matches!(
            Catalog::new(vec![bad_ra]),
            Err(PoiSelectorError::InvalidEntry(_))
        ));

        let bad_dec = CatalogEntry::new(">Bad", (1, 0, 0), (-91, 0, 0));
        assert!(Catalog::new(vec![bad_dec]).is_err());

        let bad_minute = CatalogEntry::new(">Bad", (1, 0, 0), (10, 60, 0));
        assert!(Catalog::new(vec![bad_minute]).is_err());

        let blank = CatalogEntry::new("  ", (1, 0, 0), (10, 0, 0));
        assert!(Catalog::new(vec![blank]).is_err());
    }

    #[test]
    fn keeps_small_northern_offsets_as_entered() {
        // 0° with minutes is accepted and stays north of the equator.
        let entry = CatalogEntry::new(">Near Equator", (6, 0, 0), (0, 45, 0));
        let catalog = Catalog::new(vec![entry]).unwrap();
        assert_eq!(catalog.entry_at(0).declination().total_seconds(), 2700);
    }

    #[test]
    fn loads_body_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"label": ">Vega", "ra_hour": 18, "ra_minute": 36, "ra_second": 56,
                  "dec_degree": 38, "dec_minute": 47, "dec_second": 1}},
                {{"label": ">Sirius", "ra_hour": 6, "ra_minute": 45, "ra_second": 9,
                  "dec_degree": -16, "dec_minute": 42, "dec_second": 58}}
            ]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.entry_at(1).label, ">Sirius");
        assert_eq!(catalog.entry_at(1).dec_degree, -16);
        assert_eq!(catalog.entry_at(2).label, ">Home");
    }

    #[test]
    fn demo_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/northern_catalog.json");
        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.body().len(), 5);
        assert_eq!(catalog.entry_at(2).declination().total_seconds(), -19408);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(PoiSelectorError::ParseError(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Catalog::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(PoiSelectorError::IoError(_))));
    }
}
