//! Font catalog: the ordered fallback chain of CJK-capable sans families.
//!
//! The catalog is built once (usually from the system font database) and is
//! read-only afterwards. Face data is parsed lazily the first time a family
//! is consulted for a glyph.

use ab_glyph::{Font, FontVec};
use log::debug;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

const LEGACY_CJK_FAMILIES: [&str; 4] = ["SimHei", "SimKai", "SimSun", "SimSun-ExtB"];

/// Order candidate family names into the fallback chain.
///
/// Priority: the two WenQuanYi families, `Noto Sans CJK*`, `Microsoft YaHei*`,
/// the legacy `Sim*` families, any other CJK-tagged `Noto Sans` family, and
/// finally every other family with "sans" in its name. Names within a group
/// are sorted and each family appears once.
pub fn select_families<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: BTreeSet<&str> = names.into_iter().collect();
    let groups: [fn(&str) -> bool; 7] = [
        |n| n == "WenQuanYi Micro Hei",
        |n| n == "WenQuanYi Zen Hei",
        |n| n.starts_with("Noto Sans CJK"),
        |n| n.starts_with("Microsoft YaHei"),
        |n| LEGACY_CJK_FAMILIES.contains(&n),
        |n| n.starts_with("Noto Sans") && n.to_lowercase().contains("cjk"),
        |n| !n.starts_with("Noto Sans") && n.to_lowercase().contains("sans"),
    ];

    let mut chain: Vec<String> = Vec::new();
    for matches in groups {
        for name in names.iter().copied().filter(|n| matches(n)) {
            if !chain.iter().any(|c| c == name) {
                chain.push(name.to_string());
            }
        }
    }
    chain
}

struct FontEntry {
    family: String,
    id: fontdb::ID,
    face: OnceLock<Option<FontVec>>,
}

/// Ordered, immutable font fallback chain.
pub struct FontCatalog {
    db: fontdb::Database,
    entries: Vec<FontEntry>,
}

impl FontCatalog {
    /// Scan the system fonts and build the fallback chain.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::from_database(db)
    }

    /// Build a catalog from in-memory font files.
    pub fn from_font_data(fonts: Vec<Vec<u8>>) -> Self {
        let mut db = fontdb::Database::new();
        for data in fonts {
            db.load_font_data(data);
        }
        Self::from_database(db)
    }

    /// A catalog with no fonts. Text is drawn as placeholder boxes.
    pub fn empty() -> Self {
        Self::from_database(fontdb::Database::new())
    }

    pub fn from_database(db: fontdb::Database) -> Self {
        let scanned: Vec<&str> = db
            .faces()
            .filter_map(|face| face.families.first().map(|(name, _)| name.as_str()))
            .collect();
        let families = select_families(scanned);

        let entries: Vec<FontEntry> = families
            .into_iter()
            .filter_map(|family| {
                let id = db.query(&fontdb::Query {
                    families: &[fontdb::Family::Name(&family)],
                    weight: fontdb::Weight::NORMAL,
                    stretch: fontdb::Stretch::Normal,
                    style: fontdb::Style::Normal,
                })?;
                Some(FontEntry {
                    family,
                    id,
                    face: OnceLock::new(),
                })
            })
            .collect();

        debug!(
            "Font catalog built: {} of {} faces selected",
            entries.len(),
            db.len()
        );

        Self { db, entries }
    }

    /// Family names in fallback order.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.family.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First face in the chain that has a glyph for `c`.
    pub fn face_for(&self, c: char) -> Option<&FontVec> {
        self.entries
            .iter()
            .filter_map(|entry| self.face(entry))
            .find(|face| face.glyph_id(c).0 != 0)
    }

    /// First loadable face in the chain; its metrics drive line placement.
    pub fn primary_face(&self) -> Option<&FontVec> {
        self.entries.iter().find_map(|entry| self.face(entry))
    }

    fn face<'a>(&'a self, entry: &'a FontEntry) -> Option<&'a FontVec> {
        entry
            .face
            .get_or_init(|| {
                let loaded = self.db.with_face_data(entry.id, |data, index| {
                    FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
                });
                let face = loaded.flatten();
                if face.is_none() {
                    debug!("Skipping unreadable font family {}", entry.family);
                }
                face
            })
            .as_ref()
    }
}

impl fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCatalog")
            .field("families", &self.families().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const SANS: &[u8] = include_bytes!("../tests/fixtures/fonts/DejaVuSans.ttf");
    const SANS_MONO: &[u8] = include_bytes!("../tests/fixtures/fonts/DejaVuSansMono.ttf");

    /// "DejaVu Sans" then "DejaVu Sans Mono"; only the latter covers U+2336.
    pub(crate) fn fixture_catalog() -> FontCatalog {
        FontCatalog::from_font_data(vec![SANS_MONO.to_vec(), SANS.to_vec()])
    }

    #[test]
    fn chain_follows_priority_groups() {
        let scanned = [
            "DejaVu Sans",
            "Noto Sans",
            "Noto Sans CJK SC",
            "SimSun",
            "WenQuanYi Zen Hei",
            "Noto Serif",
            "WenQuanYi Micro Hei",
            "Microsoft YaHei UI",
            "Noto Sans Mono CJK JP",
            "Liberation Sans",
        ];
        let chain = select_families(scanned);
        assert_eq!(
            chain,
            vec![
                "WenQuanYi Micro Hei",
                "WenQuanYi Zen Hei",
                "Noto Sans CJK SC",
                "Microsoft YaHei UI",
                "SimSun",
                "Noto Sans Mono CJK JP",
                "DejaVu Sans",
                "Liberation Sans",
            ]
        );
    }

    #[test]
    fn chain_deduplicates_and_skips_unrelated() {
        let chain = select_families(["Arial", "DejaVu Sans", "DejaVu Sans", "Times"]);
        assert_eq!(chain, vec!["DejaVu Sans"]);
        assert!(select_families(std::iter::empty()).is_empty());
    }

    #[test]
    fn empty_catalog_has_no_faces() {
        let catalog = FontCatalog::empty();
        assert!(catalog.is_empty());
        assert!(catalog.face_for('A').is_none());
        assert!(catalog.primary_face().is_none());
    }

    #[test]
    fn fallback_uses_first_covering_face() {
        let catalog = fixture_catalog();
        assert_eq!(catalog.families().collect::<Vec<_>>(), vec!["DejaVu Sans", "DejaVu Sans Mono"]);

        let primary = catalog.primary_face().expect("primary face");
        let latin = catalog.face_for('A').expect("latin face");
        assert!(std::ptr::eq(latin, primary));
        // Faces load once and are reused
        assert!(std::ptr::eq(catalog.face_for('B').expect("latin face"), primary));

        let apl = catalog.face_for('\u{2336}').expect("fallback face");
        assert!(!std::ptr::eq(apl, primary));
        assert_ne!(apl.glyph_id('\u{2336}').0, 0);

        assert!(catalog.face_for('中').is_none());
    }

    #[test]
    fn garbage_font_data_is_ignored() {
        let catalog = FontCatalog::from_font_data(vec![b"not a font".to_vec()]);
        assert!(catalog.is_empty());
    }
}
