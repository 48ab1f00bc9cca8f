//! The reference catalog of study corpora, and seeding it into storage.

use crate::domain::NewTextStudy;
use crate::ports::{DatabaseService, PortResult};

pub const TALMUD_BAVLI: &str = "Talmud Bavli";
pub const MISHNA: &str = "Mishna";
pub const TEHILIM: &str = "Tehilim";
pub const PARASHA_DEVARIM: &str = "Parasha Devarim";

const SEFARIA: &str = "https://www.sefaria.org";

/// (book, [(tractate, daf count)])
const TALMUD_BAVLI_TRACTATES: &[(&str, &[(&str, u32)])] = &[
    ("Zeraim", &[("Berakhot", 64)]),
    (
        "Moed",
        &[
            ("Shabbat", 157),
            ("Eruvin", 105),
            ("Pesachim", 121),
            ("Shekalim", 22),
            ("Yoma", 88),
            ("Sukkah", 56),
            ("Beitzah", 40),
            ("Rosh Hashanah", 35),
            ("Taanit", 31),
            ("Megillah", 32),
            ("Moed Katan", 29),
            ("Chagigah", 27),
        ],
    ),
    (
        "Nashim",
        &[
            ("Yevamot", 122),
            ("Ketubot", 112),
            ("Nedarim", 91),
            ("Nazir", 66),
            ("Sotah", 49),
            ("Gittin", 90),
            ("Kiddushin", 82),
        ],
    ),
    (
        "Nezikin",
        &[
            ("Bava Kamma", 119),
            ("Bava Metzia", 119),
            ("Bava Batra", 176),
            ("Sanhedrin", 113),
            ("Makkot", 24),
            ("Shevuot", 49),
            ("Avodah Zarah", 76),
            ("Horayot", 14),
        ],
    ),
    (
        "Kodashim",
        &[
            ("Zevachim", 120),
            ("Menachot", 110),
            ("Chullin", 142),
            ("Bekhorot", 61),
            ("Arakhin", 34),
            ("Temurah", 34),
            ("Keritot", 28),
            ("Meilah", 22),
            ("Tamid", 10),
            ("Middot", 4),
            ("Kinnim", 3),
        ],
    ),
    ("Toharot", &[("Niddah", 73)]),
];

/// (book, [(tractate, chapter count)])
const MISHNA_TRACTATES: &[(&str, &[(&str, u32)])] = &[
    (
        "Zeraim",
        &[
            ("Berakhot", 9),
            ("Peah", 8),
            ("Demai", 7),
            ("Kilayim", 9),
            ("Sheviit", 10),
            ("Terumot", 11),
            ("Maasrot", 5),
            ("Maaser Sheni", 5),
            ("Challah", 4),
            ("Orlah", 3),
            ("Bikkurim", 3),
        ],
    ),
    (
        "Moed",
        &[
            ("Shabbat", 24),
            ("Eruvin", 10),
            ("Pesachim", 10),
            ("Shekalim", 8),
            ("Yoma", 8),
            ("Sukkah", 5),
            ("Beitzah", 5),
            ("Rosh Hashanah", 4),
            ("Taanit", 4),
            ("Megillah", 4),
            ("Moed Katan", 3),
            ("Chagigah", 3),
        ],
    ),
    (
        "Nashim",
        &[
            ("Yevamot", 16),
            ("Ketubot", 13),
            ("Nedarim", 11),
            ("Nazir", 9),
            ("Sotah", 9),
            ("Gittin", 9),
            ("Kiddushin", 4),
        ],
    ),
    (
        "Nezikin",
        &[
            ("Bava Kamma", 10),
            ("Bava Metzia", 10),
            ("Bava Batra", 10),
            ("Sanhedrin", 11),
            ("Makkot", 3),
            ("Shevuot", 8),
            ("Eduyot", 8),
            ("Avodah Zarah", 5),
            ("Avot", 5),
            ("Horayot", 3),
        ],
    ),
    (
        "Kodashim",
        &[
            ("Zevachim", 14),
            ("Menachot", 13),
            ("Chullin", 12),
            ("Bekhorot", 9),
            ("Arakhin", 9),
            ("Temurah", 7),
            ("Keritot", 6),
            ("Meilah", 6),
            ("Tamid", 7),
            ("Middot", 5),
            ("Kinnim", 3),
        ],
    ),
    (
        "Toharot",
        &[
            ("Kelim", 30),
            ("Oholot", 18),
            ("Negaim", 14),
            ("Parah", 12),
            ("Tohorot", 10),
            ("Mikvaot", 10),
            ("Niddah", 10),
            ("Makhshirin", 6),
            ("Zavim", 5),
            ("Tevul Yom", 4),
            ("Yadayim", 4),
            ("Oktzin", 3),
        ],
    ),
];

/// Psalms per book of Tehilim.
const TEHILIM_BOOKS: &[(&str, u32)] = &[
    ("Sefer 1", 41),
    ("Sefer 2", 31),
    ("Sefer 3", 17),
    ("Sefer 4", 17),
    ("Sefer 5", 44),
];

/// (portion, opening verse in Deuteronomy, verse count)
const DEVARIM_PORTIONS: &[(&str, &str, u32)] = &[
    ("Devarim", "1.1", 105),
    ("Vaetchanan", "3.23", 122),
    ("Eikev", "7.12", 111),
    ("Re'eh", "11.26", 126),
    ("Shoftim", "16.18", 97),
    ("Ki Teitzei", "21.10", 110),
    ("Ki Tavo", "26.1", 122),
    ("Nitzavim", "29.9", 40),
    ("Vayelech", "31.1", 30),
    ("Ha'Azinu", "32.1", 52),
    ("V'Zot HaBracha", "33.1", 41),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub book: String,
    pub name: String,
    pub link: String,
    pub total_sections: u32,
}

#[derive(Debug, Clone)]
pub struct CatalogType {
    pub name: &'static str,
    pub entries: Vec<CatalogEntry>,
}

fn sefaria_ref(name: &str) -> String {
    name.replace(' ', "_")
}

fn tractates(
    books: &[(&str, &[(&str, u32)])],
    link: impl Fn(&str) -> String,
) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    for (book, tractates) in books {
        for (name, total_sections) in tractates.iter() {
            entries.push(CatalogEntry {
                book: book.to_string(),
                name: name.to_string(),
                link: link(*name),
                total_sections: *total_sections,
            });
        }
    }
    entries
}

fn tehilim() -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    let mut psalm = 1;
    for (book, count) in TEHILIM_BOOKS {
        for _ in 0..*count {
            entries.push(CatalogEntry {
                book: book.to_string(),
                name: format!("Tehilim {psalm}"),
                link: format!("{SEFARIA}/Psalms.{psalm}"),
                total_sections: 1,
            });
            psalm += 1;
        }
    }
    entries
}

fn devarim() -> Vec<CatalogEntry> {
    DEVARIM_PORTIONS
        .iter()
        .map(|(portion, verse, total_sections)| CatalogEntry {
            book: "Devarim".to_string(),
            name: format!("Parashat {portion}"),
            link: format!("{SEFARIA}/Deuteronomy.{verse}?lang=he&aliyot=0"),
            total_sections: *total_sections,
        })
        .collect()
}

/// Every study type with its text studies, in display order.
pub fn reference_catalog() -> Vec<CatalogType> {
    vec![
        CatalogType {
            name: TALMUD_BAVLI,
            entries: tractates(TALMUD_BAVLI_TRACTATES, |name| {
                format!("{SEFARIA}/{}", sefaria_ref(name))
            }),
        },
        CatalogType {
            name: MISHNA,
            entries: tractates(MISHNA_TRACTATES, |name| match name {
                "Avot" => format!("{SEFARIA}/Pirkei_Avot"),
                _ => format!("{SEFARIA}/Mishnah_{}", sefaria_ref(name)),
            }),
        },
        CatalogType {
            name: TEHILIM,
            entries: tehilim(),
        },
        CatalogType {
            name: PARASHA_DEVARIM,
            entries: devarim(),
        },
    ]
}

/// Inserts the reference catalog. A type that already has text studies is
/// left untouched, so seeding is safe to run on every start.
///
/// Returns the number of text studies inserted.
pub async fn seed_catalog(db: &dyn DatabaseService) -> PortResult<usize> {
    let mut inserted = 0;
    for catalog_type in reference_catalog() {
        let study_type = db.ensure_text_study_type(catalog_type.name).await?;
        if !db.list_text_studies(study_type.id).await?.is_empty() {
            continue;
        }
        for entry in catalog_type.entries {
            db.create_text_study(NewTextStudy {
                type_id: study_type.id,
                name: entry.name,
                book: entry.book,
                link: entry.link,
                total_sections: entry.total_sections,
            })
            .await?;
            inserted += 1;
        }
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_type(name: &str) -> CatalogType {
        reference_catalog()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap()
    }

    #[test]
    fn corpus_sizes() {
        assert_eq!(catalog_type(TALMUD_BAVLI).entries.len(), 40);
        assert_eq!(catalog_type(MISHNA).entries.len(), 63);
        assert_eq!(catalog_type(TEHILIM).entries.len(), 150);
        assert_eq!(catalog_type(PARASHA_DEVARIM).entries.len(), 11);
    }

    #[test]
    fn every_entry_has_sections() {
        for catalog_type in reference_catalog() {
            assert!(catalog_type.entries.iter().all(|e| e.total_sections >= 1));
        }
    }

    #[test]
    fn tehilim_are_numbered_across_books() {
        let entries = catalog_type(TEHILIM).entries;
        assert_eq!(entries[0].name, "Tehilim 1");
        assert_eq!(entries[41].name, "Tehilim 42");
        assert_eq!(entries[41].book, "Sefer 2");
        assert_eq!(entries[149].link, "https://www.sefaria.org/Psalms.150");
    }

    #[test]
    fn links_follow_sefaria_naming() {
        let bavli = catalog_type(TALMUD_BAVLI).entries;
        let bava_batra = bavli.iter().find(|e| e.name == "Bava Batra").unwrap();
        assert_eq!(bava_batra.link, "https://www.sefaria.org/Bava_Batra");
        assert_eq!(bava_batra.total_sections, 176);

        let mishna = catalog_type(MISHNA).entries;
        let avot = mishna.iter().find(|e| e.name == "Avot").unwrap();
        assert_eq!(avot.link, "https://www.sefaria.org/Pirkei_Avot");
        let kelim = mishna.iter().find(|e| e.name == "Kelim").unwrap();
        assert_eq!(kelim.link, "https://www.sefaria.org/Mishnah_Kelim");
    }
}
