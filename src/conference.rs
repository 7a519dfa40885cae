/// FBS conferences. Each CFBD endpoint spells them differently, so the
/// spelling is chosen per endpoint rather than stored as one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conference {
    American,
    Acc,
    Big12,
    BigTen,
    ConferenceUsa,
    FbsIndependents,
    MidAmerican,
    MountainWest,
    Pac12,
    Sec,
    SunBelt,
}

impl Conference {
    /// Fixed fetch order for per-conference table builds.
    pub const ALL: [Conference; 11] = [
        Conference::American,
        Conference::Acc,
        Conference::Big12,
        Conference::BigTen,
        Conference::ConferenceUsa,
        Conference::FbsIndependents,
        Conference::MidAmerican,
        Conference::MountainWest,
        Conference::Pac12,
        Conference::Sec,
        Conference::SunBelt,
    ];

    /// Identifier accepted by `/ratings/srs?conference=`.
    pub fn srs_id(self) -> &'static str {
        match self {
            Conference::American => "AAC",
            Conference::Acc => "acc",
            Conference::Big12 => "B12",
            Conference::BigTen => "B1G",
            Conference::ConferenceUsa => "CUSA",
            Conference::FbsIndependents => "Ind",
            Conference::MidAmerican => "MAC",
            Conference::MountainWest => "MWC",
            Conference::Pac12 => "PAC",
            Conference::Sec => "SEC",
            Conference::SunBelt => "SBC",
        }
    }

    /// Identifier accepted by `/ppa/teams?conference=`. Same abbreviations
    /// as the ratings endpoint.
    pub fn ppa_id(self) -> &'static str {
        self.srs_id()
    }

    /// Conference name as reported in the `conference` field of
    /// `/stats/season/advanced` rows.
    pub fn stats_name(self) -> &'static str {
        match self {
            Conference::American => "American Athletic",
            Conference::Acc => "ACC",
            Conference::Big12 => "Big 12",
            Conference::BigTen => "Big Ten",
            Conference::ConferenceUsa => "Conference USA",
            Conference::FbsIndependents => "FBS Independents",
            Conference::MidAmerican => "Mid-American",
            Conference::MountainWest => "Mountain West",
            Conference::Pac12 => "Pac-12",
            Conference::Sec => "SEC",
            Conference::SunBelt => "Sun Belt",
        }
    }

    pub fn from_stats_name(name: &str) -> Option<Conference> {
        Conference::ALL
            .into_iter()
            .find(|conf| conf.stats_name() == name)
    }
}
