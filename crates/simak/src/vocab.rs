//! Fixed vocabularies used by records and the dashboard.

/// Units seeded into a fresh register.
pub const DEFAULT_UNITS: &[&str] = &[
    "Denma Brigif 4/DR",
    "Yonif 405/SK",
    "Yonif 406/CK",
    "Yonif 407/PK",
    "Yonif TP 838/PW",
    "Yonif TP 888/SS",
];

/// Rank vocabulary, lowest first. The dashboard reports ranks in this order.
pub const RANKS: &[&str] = &[
    "Prada", "Pratu", "Praka", "Kopda", "Koptu", "Serda", "Sertu", "Serka", "Serma", "Letda",
    "Lettu", "Kapten", "Mayor", "Letkol",
];

/// Suggested case categories. Records are not constrained to this set.
pub const CASE_CATEGORIES: &[&str] = &[
    "Asusila",
    "THTI",
    "Desersi",
    "Narkoba",
    "Judi Online",
    "Penganiayaan",
    "Lalu Lintas",
    "Lain-lain",
];

/// Suggested action notes for cases still in legal process.
pub const ACTIONS: &[&str] = &[
    "Usul Schorsing",
    "Usul Pencabutan Schorsing",
    "Usul PDTH",
    "Usul Desersi",
    "Tahanan Satuan",
    "Tahanan Pom",
    "Sidang",
    "Tahanan Cimahi",
    "Usul Lapbangpri",
];

/// A fixed list offered to the operator when filling in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Case categories.
    Categories,
    /// Action notes.
    Actions,
    /// Ranks, lowest first.
    Ranks,
}

impl Vocabulary {
    /// Every list, in display order.
    pub const ALL: [Self; 3] = [Self::Categories, Self::Actions, Self::Ranks];

    /// Heading printed above the list.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Categories => "Perkara",
            Self::Actions => "Tindakan",
            Self::Ranks => "Pangkat",
        }
    }

    /// Entries of the list.
    #[must_use]
    pub fn entries(self) -> &'static [&'static str] {
        match self {
            Self::Categories => CASE_CATEGORIES,
            Self::Actions => ACTIONS,
            Self::Ranks => RANKS,
        }
    }
}

/// The default unit list as owned strings.
#[must_use]
pub fn default_units() -> Vec<String> {
    DEFAULT_UNITS.iter().map(|u| (*u).to_string()).collect()
}

/// Abbreviate a unit name for chart axes.
#[must_use]
pub fn short_unit_name(unit: &str) -> String {
    unit.replacen("Yonif TP ", "YTP ", 1)
        .replacen("Yonif ", "Y", 1)
        .replacen("Denma Brigif 4/DR", "Denma", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_units_match_seed() {
        let units = default_units();
        assert_eq!(units.len(), DEFAULT_UNITS.len());
        assert_eq!(units[0], "Denma Brigif 4/DR");
    }

    #[test]
    fn test_short_unit_name() {
        assert_eq!(short_unit_name("Yonif TP 838/PW"), "YTP 838/PW");
        assert_eq!(short_unit_name("Yonif 405/SK"), "Y405/SK");
        assert_eq!(short_unit_name("Denma Brigif 4/DR"), "Denma");
        assert_eq!(short_unit_name("Kompi Bantuan"), "Kompi Bantuan");
    }

    #[test]
    fn test_vocabulary_entries() {
        assert_eq!(Vocabulary::Categories.entries()[2], "Desersi");
        assert!(Vocabulary::Actions.entries().contains(&"Tahanan Pom"));
        assert_eq!(Vocabulary::Ranks.entries().first(), Some(&"Prada"));
        let titles: Vec<&str> = Vocabulary::ALL.iter().map(|v| v.title()).collect();
        assert_eq!(titles, ["Perkara", "Tindakan", "Pangkat"]);
    }

    #[test]
    fn test_ranks_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for rank in RANKS {
            assert!(seen.insert(rank), "duplicate rank {rank}");
        }
    }
}
