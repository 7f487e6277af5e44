use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bootsplash",
    author,
    version,
    about = "Splash-screen bootstrap loader for a packaged engine runtime"
)]
pub struct Cli {
    /// Theme TOML file. Built-in defaults apply when absent.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL the engine bundle is fetched from.
    #[arg(long, value_name = "URL", env = "BOOTSPLASH_BUNDLE_URL")]
    pub bundle_url: String,

    /// Bundle name, appended to the base URL as `<name>.pck`.
    #[arg(long, value_name = "NAME", default_value = "engine")]
    pub bundle: String,

    /// Engine executable started once the bundle is on disk.
    #[arg(long, value_name = "PATH", default_value = "engine/godot")]
    pub executable: PathBuf,

    /// Extra argument passed to the engine executable (repeatable).
    #[arg(long = "engine-arg", value_name = "ARG")]
    pub engine_args: Vec<String>,

    /// Splash window size.
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        default_value = "1280x720",
        value_parser = parse_size
    )]
    pub size: (u32, u32),

    /// Logo image, overriding the theme's path.
    #[arg(long, value_name = "FILE")]
    pub logo: Option<PathBuf>,

    /// Background image, overriding the theme's path.
    #[arg(long, value_name = "FILE")]
    pub background: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let (width, height) = raw
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{width}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{height}'"))?;
    if width == 0 || height == 0 {
        return Err("window size must be non-zero".to_string());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_size_pairs() {
        assert_eq!(parse_size("1920x1080"), Ok((1920, 1080)));
        assert_eq!(parse_size("375 x 812"), Ok((375, 812)));
        assert!(parse_size("1920").is_err());
        assert!(parse_size("0x600").is_err());
        assert!(parse_size("widex600").is_err());
    }
}
