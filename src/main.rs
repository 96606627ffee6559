mod cache;
mod config;
mod fen;
mod layout;
mod render;
mod server;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::render::{Assets, Orientation};

fn cli() -> Command {
    Command::new("fen-render")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders chessboard PNGs from FEN strings")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("JSON config file (missing file means defaults)")
                .default_value(config::DEFAULT_CONFIG_PATH)
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve GET /fen/<fen>/<0|1> over HTTP")
                .arg(Arg::new("host").long("host").value_name("HOST"))
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_name("PORT")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(
                    Arg::new("cache-dir")
                        .long("cache-dir")
                        .value_name("DIR")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(assets_arg())
                .arg(plain_tiles_arg()),
        )
        .subcommand(
            Command::new("render")
                .about("Render one FEN to a PNG file (no cache)")
                .arg(Arg::new("fen").long("fen").value_name("FEN").required(true))
                .arg(
                    Arg::new("flipped")
                        .long("flipped")
                        .help("Rotate the board 180 degrees")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("PATH")
                        .default_value("board.png")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(assets_arg())
                .arg(plain_tiles_arg()),
        )
        .subcommand(Command::new("init-config").about("Write the default config file"))
}

fn assets_arg() -> Arg {
    Arg::new("assets-dir")
        .long("assets-dir")
        .value_name("DIR")
        .help("Directory with tile and piece sprites")
        .value_parser(clap::value_parser!(PathBuf))
}

fn plain_tiles_arg() -> Arg {
    Arg::new("plain-tiles")
        .long("plain-tiles")
        .help("Draw solid squares when tile sprites are missing")
        .action(ArgAction::SetTrue)
}

/// CLI flags win over the config file. Subcommands only define some of
/// these, so lookups of undefined ids are treated as "not given".
fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if let Ok(Some(host)) = matches.try_get_one::<String>("host") {
        config.host = host.clone();
    }
    if let Ok(Some(port)) = matches.try_get_one::<u16>("port") {
        config.port = *port;
    }
    if let Ok(Some(dir)) = matches.try_get_one::<PathBuf>("cache-dir") {
        config.cache_dir = dir.clone();
    }
    if let Ok(Some(dir)) = matches.try_get_one::<PathBuf>("assets-dir") {
        config.assets_dir = dir.clone();
    }
    if let Ok(Some(true)) = matches.try_get_one::<bool>("plain-tiles") {
        config.plain_tiles_fallback = true;
    }
}

fn render_to_file(config: &Config, fen: &str, orientation: Orientation, output: &Path) -> Result<()> {
    let assets = Assets::new(&config.assets_dir);
    let image = render::render_fen(fen, orientation, &assets, config.plain_tiles_fallback)?;
    image
        .save(output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    // Safe due to default
    let config_path = matches.get_one::<PathBuf>("config").cloned().unwrap_or_default();
    let mut config = config::load_config(&config_path)?;

    match matches.subcommand() {
        Some(("serve", sub)) => {
            apply_overrides(&mut config, sub);
            println!("fen-render {} starting...", env!("CARGO_PKG_VERSION"));
            server::serve(&config).await
        }
        Some(("render", sub)) => {
            apply_overrides(&mut config, sub);
            let fen = sub.get_one::<String>("fen").context("--fen is required")?;
            let orientation = if sub.get_flag("flipped") {
                Orientation::Flipped
            } else {
                Orientation::Normal
            };
            let output = sub.get_one::<PathBuf>("output").context("--output is required")?;
            render_to_file(&config, fen, orientation, output)
        }
        Some(("init-config", _)) => {
            config::save_config(&config_path, &config)?;
            println!("Wrote {}", config_path.display());
            Ok(())
        }
        _ => anyhow::bail!("No subcommand given; see --help"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_subcommand_required() {
        assert!(cli().try_get_matches_from(["fen-render"]).is_err());
    }

    #[test]
    fn test_serve_overrides() {
        let matches = cli().get_matches_from([
            "fen-render", "serve", "--port", "8080", "--assets-dir", "sprites", "--plain-tiles",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, sub);

        assert_eq!(config.port, 8080);
        assert_eq!(config.assets_dir, PathBuf::from("sprites"));
        assert!(config.plain_tiles_fallback);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.cache_dir, PathBuf::from("fens"));
    }

    #[test]
    fn test_render_leaves_unset_fields() {
        let matches = cli().get_matches_from(["fen-render", "render", "--fen", "8/8/8/8/8/8/8/8"]);
        let (_, sub) = matches.subcommand().unwrap();
        let mut config = Config {
            plain_tiles_fallback: true,
            ..Config::default()
        };
        apply_overrides(&mut config, sub);

        assert!(config.plain_tiles_fallback);
        assert!(!sub.get_flag("flipped"));
        assert_eq!(sub.get_one::<PathBuf>("output"), Some(&PathBuf::from("board.png")));
    }

    #[test]
    fn test_render_to_file() {
        let dir = std::env::temp_dir().join(format!("fen-render-main-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("board.png");
        let config = Config {
            assets_dir: dir.join("no-sprites"),
            plain_tiles_fallback: true,
            ..Config::default()
        };

        render_to_file(&config, "8/8/8/8/8/8/8/8 w - - 0 1", Orientation::Flipped, &output).unwrap();
        let img = image::open(&output).unwrap();
        assert_eq!((img.width(), img.height()), (800, 800));

        assert!(render_to_file(&config, "8/8/8", Orientation::Normal, &output).is_err());
    }
}
