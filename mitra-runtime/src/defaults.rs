use mitra_core::config::{
    AgentSettings, AppConfig, BackendKind, BackendRoutes, DEFAULT_REQUEST_TIMEOUT_MS,
    FunctionsSettings,
};
use mitra_core::language::Language;
use mitra_core::result::PriceQuote;

pub const DEFAULT_APP_NAME: &str = "fasal_mitra_kisan";
pub const DEFAULT_AGENT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_FUNCTIONS_BASE_URL: &str = "http://localhost:54321";
pub const DEFAULT_LOCATION: &str = "Bangalore";

/// Locations offered by the market screen.
pub const MARKET_LOCATIONS: [&str; 5] = ["Bangalore", "Mysore", "Hubli", "Mangalore", "Bellary"];

pub fn default_app_config() -> AppConfig {
    AppConfig {
        backends: BackendRoutes::all(BackendKind::Simulated),
        agent: AgentSettings {
            base_url: DEFAULT_AGENT_BASE_URL.into(),
            app_name: DEFAULT_APP_NAME.into(),
        },
        functions: FunctionsSettings {
            base_url: DEFAULT_FUNCTIONS_BASE_URL.into(),
            api_key_present: false,
        },
        language: Language::English,
        default_location: DEFAULT_LOCATION.into(),
        request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        simulated_latency_ms: 0,
        history_enabled: true,
    }
}

fn quote(crop: &str, price: u32, unit: &str, change_percent: f32, market: &str) -> PriceQuote {
    PriceQuote {
        crop: crop.into(),
        price,
        unit: unit.into(),
        change_percent,
        market: market.into(),
    }
}

/// Today's fixed price board.
pub fn price_board() -> Vec<PriceQuote> {
    vec![
        quote("Tomato", 45, "kg", 8.2, "Bangalore APMC"),
        quote("Onion", 35, "kg", -2.1, "Mysore Market"),
        quote("Rice", 3200, "quintal", 0.0, "Mandya Mandi"),
        quote("Wheat", 2850, "quintal", 5.5, "Hubli Market"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_core::result::PriceTrend;

    #[test]
    fn price_board_lists_four_markets() {
        let board = price_board();
        let trends: Vec<_> = board.iter().map(|q| (q.crop.as_str(), q.trend())).collect();
        assert_eq!(
            trends,
            vec![
                ("Tomato", PriceTrend::Up),
                ("Onion", PriceTrend::Down),
                ("Rice", PriceTrend::Stable),
                ("Wheat", PriceTrend::Up),
            ]
        );
        assert_eq!(board[2].price_label(), "₹3200/quintal 0%");
        assert_eq!(board[0].market, "Bangalore APMC");
    }

    #[test]
    fn default_location_is_offered_by_market_screen() {
        assert!(MARKET_LOCATIONS.contains(&DEFAULT_LOCATION));
        assert_eq!(default_app_config().default_location, DEFAULT_LOCATION);
    }
}
