use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AffiliateCli {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value = "16")]
    pub database_max_connections: usize,

    /// API host
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub api_host: String,

    /// API port
    #[arg(long, env = "API_PORT", default_value = "8080")]
    pub api_port: u16,

    /// Program whose invoices are left out of the admin payouts report
    #[arg(long, env = "PAYOUTS_EXCLUDED_PROGRAM_ID")]
    pub payouts_excluded_program_id: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = AffiliateCli::try_parse_from([
            "affiliate-bin",
            "--database-url",
            "postgres://localhost/affiliate",
        ])
        .unwrap();

        assert_eq!(cli.database_max_connections, 16);
        assert_eq!(cli.api_host, "0.0.0.0");
        assert_eq!(cli.api_port, 8080);
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_cli_flags() {
        let cli = AffiliateCli::try_parse_from([
            "affiliate-bin",
            "--database-url",
            "postgres://localhost/affiliate",
            "--api-port",
            "9000",
            "--payouts-excluded-program-id",
            "prog_acme",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.api_port, 9000);
        assert_eq!(cli.payouts_excluded_program_id.as_deref(), Some("prog_acme"));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        AffiliateCli::command().debug_assert();
    }
}
