#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub port: u16,
    // Email service configuration
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub default_currency: String,
    pub schedule: ScheduleConfig,
}

/// Knobs for the two timer-driven jobs. Every value can be overridden
/// through the environment so deployments can tune cadence without a rebuild.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub visit_horizon_days: i64,
    pub payment_lead_days: Vec<i64>,
    pub payment_scan_interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            visit_horizon_days: 30,
            payment_lead_days: vec![10, 7, 3, 1],
            payment_scan_interval_minutes: 10,
        }
    }
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        let smtp_host = std::env::var("SMTP_HOST")
            .unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .unwrap_or(587);
        let smtp_username = std::env::var("SMTP_USERNAME")
            .unwrap_or_else(|_| "".to_string());
        let smtp_password = std::env::var("SMTP_PASSWORD")
            .unwrap_or_else(|_| "".to_string());
        let from_email = std::env::var("FROM_EMAIL")
            .unwrap_or_else(|_| "Facilicore <noreply@facilicore.app>".to_string());

        let default_currency = std::env::var("DEFAULT_CURRENCY")
            .unwrap_or_else(|_| "USD".to_string());

        Config {
            database_url,
            app_url,
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8000),
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            default_currency,
            schedule: ScheduleConfig::from_env(),
        }
    }
}

impl ScheduleConfig {
    pub fn from_env() -> ScheduleConfig {
        let defaults = ScheduleConfig::default();

        let visit_horizon_days = std::env::var("SERVICE_VISIT_HORIZON_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(defaults.visit_horizon_days);

        // Comma separated list of lead-day thresholds, e.g. "10,7,3,1"
        let payment_lead_days = std::env::var("PAYMENT_REMINDER_LEAD_DAYS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse::<i64>().ok())
                    .filter(|days| *days > 0)
                    .collect::<Vec<i64>>()
            })
            .filter(|parsed| !parsed.is_empty())
            .unwrap_or(defaults.payment_lead_days);

        let payment_scan_interval_minutes = std::env::var("PAYMENT_SCAN_INTERVAL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or(defaults.payment_scan_interval_minutes);

        ScheduleConfig {
            visit_horizon_days,
            payment_lead_days,
            payment_scan_interval_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_defaults() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.visit_horizon_days, 30);
        assert_eq!(schedule.payment_lead_days, vec![10, 7, 3, 1]);
        assert_eq!(schedule.payment_scan_interval_minutes, 10);
    }
}
