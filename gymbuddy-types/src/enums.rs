use serde::{Deserialize, Serialize};

/// Window used to filter and aggregate workout plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    Month,
    Week,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Month => "month",
            PeriodType::Week => "week",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "month" => Some(PeriodType::Month),
            "week" => Some(PeriodType::Week),
            _ => None,
        }
    }
}

/// Sports a member can list on their profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sport {
    Atletik,
    Renang,
    Bersepeda,
    PanjatTebing,
    Golf,
    Tenis,
    Badminton,
    Panahan,
    BelaDiri,
    SepakBola,
    Futsal,
    Basket,
    Voli,
    Hoki,
    Baseball,
    Softball,
    Rugbi,
    Gym,
    Hiking,
    Diving,
    Ski,
    Snowboard,
    IceSkating,
}

impl Sport {
    pub const ALL: [Sport; 23] = [
        Sport::Atletik,
        Sport::Renang,
        Sport::Bersepeda,
        Sport::PanjatTebing,
        Sport::Golf,
        Sport::Tenis,
        Sport::Badminton,
        Sport::Panahan,
        Sport::BelaDiri,
        Sport::SepakBola,
        Sport::Futsal,
        Sport::Basket,
        Sport::Voli,
        Sport::Hoki,
        Sport::Baseball,
        Sport::Softball,
        Sport::Rugbi,
        Sport::Gym,
        Sport::Hiking,
        Sport::Diving,
        Sport::Ski,
        Sport::Snowboard,
        Sport::IceSkating,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Sport::Atletik => "atletik",
            Sport::Renang => "renang",
            Sport::Bersepeda => "bersepeda",
            Sport::PanjatTebing => "panjat-tebing",
            Sport::Golf => "golf",
            Sport::Tenis => "tenis",
            Sport::Badminton => "badminton",
            Sport::Panahan => "panahan",
            Sport::BelaDiri => "bela-diri",
            Sport::SepakBola => "sepak-bola",
            Sport::Futsal => "futsal",
            Sport::Basket => "basket",
            Sport::Voli => "voli",
            Sport::Hoki => "hoki",
            Sport::Baseball => "baseball",
            Sport::Softball => "softball",
            Sport::Rugbi => "rugbi",
            Sport::Gym => "gym",
            Sport::Hiking => "hiking",
            Sport::Diving => "diving",
            Sport::Ski => "ski",
            Sport::Snowboard => "snowboard",
            Sport::IceSkating => "ice-skating",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sport::Atletik => "Atletik",
            Sport::Renang => "Renang",
            Sport::Bersepeda => "Bersepeda",
            Sport::PanjatTebing => "Panjat Tebing",
            Sport::Golf => "Golf",
            Sport::Tenis => "Tenis",
            Sport::Badminton => "Badminton",
            Sport::Panahan => "Panahan",
            Sport::BelaDiri => "Bela Diri",
            Sport::SepakBola => "Sepak Bola",
            Sport::Futsal => "Futsal",
            Sport::Basket => "Basket",
            Sport::Voli => "Voli",
            Sport::Hoki => "Hoki",
            Sport::Baseball => "Baseball",
            Sport::Softball => "Softball",
            Sport::Rugbi => "Rugbi",
            Sport::Gym => "Gym / Fitness",
            Sport::Hiking => "Hiking",
            Sport::Diving => "Diving",
            Sport::Ski => "Ski",
            Sport::Snowboard => "Snowboard",
            Sport::IceSkating => "Ice Skating",
        }
    }

    /// Match a slug or display label, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Sport::ALL
            .into_iter()
            .find(|sport| sport.slug().eq_ignore_ascii_case(s) || sport.label().eq_ignore_ascii_case(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_type_round_trip() {
        for period in [PeriodType::Month, PeriodType::Week] {
            assert_eq!(PeriodType::parse(period.as_str()), Some(period));
        }
        assert_eq!(PeriodType::parse("WEEK"), Some(PeriodType::Week));
        assert_eq!(PeriodType::parse("day"), None);
    }

    #[test]
    fn test_period_type_serializes_lowercase() {
        let json = serde_json::to_string(&PeriodType::Week).unwrap();
        assert_eq!(json, "\"week\"");
    }

    #[test]
    fn test_sport_parse_accepts_slug_or_label() {
        assert_eq!(Sport::parse("panjat-tebing"), Some(Sport::PanjatTebing));
        assert_eq!(Sport::parse("Gym / Fitness"), Some(Sport::Gym));
        assert_eq!(Sport::parse(" SEPAK BOLA "), Some(Sport::SepakBola));
        assert_eq!(Sport::parse("quidditch"), None);
    }

    #[test]
    fn test_sport_serde_uses_slug() {
        for sport in Sport::ALL {
            let json = serde_json::to_string(&sport).unwrap();
            assert_eq!(json, format!("\"{}\"", sport.slug()));
        }
    }
}
