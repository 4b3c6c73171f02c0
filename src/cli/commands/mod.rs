use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("storegate")
        .about("Storefront authentication session gateway")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("STOREGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("backend-url")
                .short('b')
                .long("backend-url")
                .help("Base URL of the commerce backend, example: https://api.store.tld/")
                .env("STOREGATE_BACKEND_URL")
                .required(true),
        )
        .arg(
            Arg::new("frontend-url")
                .short('f')
                .long("frontend-url")
                .help("Origin the storefront is served from, used for CORS and cookie flags")
                .default_value("http://localhost:3000")
                .env("STOREGATE_FRONTEND_URL"),
        )
        .arg(
            Arg::new("code-request-cooldown")
                .long("code-request-cooldown")
                .help("Seconds between verification code requests")
                .default_value("120")
                .env("STOREGATE_CODE_REQUEST_COOLDOWN")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("code-lifetime")
                .long("code-lifetime")
                .help("Seconds a verification code stays usable")
                .default_value("900")
                .env("STOREGATE_CODE_LIFETIME")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("access-token-lifetime")
                .long("access-token-lifetime")
                .help("Access token cookie lifetime in seconds")
                .default_value("300")
                .env("STOREGATE_ACCESS_TOKEN_LIFETIME")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("refresh-token-lifetime")
                .long("refresh-token-lifetime")
                .help("Refresh token cookie lifetime in seconds")
                .default_value("86400")
                .env("STOREGATE_REFRESH_TOKEN_LIFETIME")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("otp-length")
                .long("otp-length")
                .help("Number of digits in the verification code")
                .default_value("5")
                .env("STOREGATE_OTP_LENGTH")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("STOREGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
