//! The closed set of regulation kinds known to the catalog.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A regulation kind (jenis peraturan) recognized by the catalog.
///
/// The catalog's search form identifies each kind by a fixed numeric id.
/// The set is closed: unknown kinds fail at construction time via
/// [`RegulationKind::from_code`], never deep inside a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegulationKind {
    /// Undang-Undang (statute).
    Uu,
    /// Peraturan Pemerintah Pengganti Undang-Undang.
    Perppu,
    /// Peraturan Pemerintah.
    Pp,
    /// Peraturan Presiden.
    Perpres,
    /// Peraturan Menteri.
    Permen,
    /// Peraturan Daerah.
    Perda,
    /// Peraturan Bank Indonesia.
    Perban,
    /// Ketetapan MPR.
    TapMpr,
    /// Peraturan Menteri Hukum dan HAM.
    Permenkumham,
    /// Peraturan Menteri Dalam Negeri.
    Permendagri,
    /// Peraturan Menteri Keuangan.
    Permenkeu,
    /// Peraturan Menteri Kesehatan.
    Permenkes,
    /// Peraturan Menteri Pendidikan dan Kebudayaan.
    Permendikbud,
    /// Peraturan Menteri Ketenagakerjaan.
    Permenaker,
    /// Peraturan Menteri Agama.
    Permenag,
}

impl RegulationKind {
    /// All known kinds, in catalog id order.
    pub const ALL: [RegulationKind; 15] = [
        Self::Uu,
        Self::Perppu,
        Self::Pp,
        Self::Perpres,
        Self::Permen,
        Self::Perda,
        Self::Perban,
        Self::TapMpr,
        Self::Permenkumham,
        Self::Permendagri,
        Self::Permenkeu,
        Self::Permenkes,
        Self::Permendikbud,
        Self::Permenaker,
        Self::Permenag,
    ];

    /// The fixed numeric identifier used in the `jenis_peraturan_id`
    /// search parameter.
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Uu => 1,
            Self::Perppu => 2,
            Self::Pp => 3,
            Self::Perpres => 4,
            Self::Permen => 5,
            Self::Perda => 6,
            Self::Perban => 7,
            Self::TapMpr => 8,
            Self::Permenkumham => 9,
            Self::Permendagri => 10,
            Self::Permenkeu => 11,
            Self::Permenkes => 12,
            Self::Permendikbud => 13,
            Self::Permenaker => 14,
            Self::Permenag => 15,
        }
    }

    /// The upper-case short code, also used as the directory segment.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Uu => "UU",
            Self::Perppu => "PERPPU",
            Self::Pp => "PP",
            Self::Perpres => "PERPRES",
            Self::Permen => "PERMEN",
            Self::Perda => "PERDA",
            Self::Perban => "PERBAN",
            Self::TapMpr => "TAPMPR",
            Self::Permenkumham => "PERMENKUMHAM",
            Self::Permendagri => "PERMENDAGRI",
            Self::Permenkeu => "PERMENKEU",
            Self::Permenkes => "PERMENKES",
            Self::Permendikbud => "PERMENDIKBUD",
            Self::Permenaker => "PERMENAKER",
            Self::Permenag => "PERMENAG",
        }
    }

    /// The full Indonesian name of the regulation kind.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Uu => "Undang-Undang",
            Self::Perppu => "Peraturan Pemerintah Pengganti Undang-Undang",
            Self::Pp => "Peraturan Pemerintah",
            Self::Perpres => "Peraturan Presiden",
            Self::Permen => "Peraturan Menteri",
            Self::Perda => "Peraturan Daerah",
            Self::Perban => "Peraturan Bank Indonesia",
            Self::TapMpr => "Ketetapan MPR",
            Self::Permenkumham => "Peraturan Menteri Hukum dan HAM",
            Self::Permendagri => "Peraturan Menteri Dalam Negeri",
            Self::Permenkeu => "Peraturan Menteri Keuangan",
            Self::Permenkes => "Peraturan Menteri Kesehatan",
            Self::Permendikbud => "Peraturan Menteri Pendidikan dan Kebudayaan",
            Self::Permenaker => "Peraturan Menteri Ketenagakerjaan",
            Self::Permenag => "Peraturan Menteri Agama",
        }
    }

    /// Parses a short code, case-insensitively.
    ///
    /// Returns `None` for anything outside the closed set.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let upper = code.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|k| k.code() == upper)
    }

    /// Looks up a kind by its catalog identifier.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }
}

impl fmt::Display for RegulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
