use clap::Parser;
use color_eyre::Result;
use datadesk::config::{AppConfig, ConfigManager, Theme};
use datadesk::io::LoadOptions;
use datadesk::{App, AppEvent, APP_NAME};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::sync::mpsc::channel;

#[derive(Parser, Debug)]
#[command(version, about = "datadesk")]
struct Args {
    /// File to open (.csv, .tsv, .xlsx, .xls, .xlsm, .xlsb)
    path: Option<PathBuf>,

    /// Specify that the file has no header
    #[arg(long = "no-header")]
    no_header: Option<bool>,

    /// Specify the delimiter to use when reading a file
    #[arg(long = "delimiter")]
    delimiter: Option<u8>,

    /// Rows considered when preparing charts
    #[arg(long = "row-limit")]
    row_limit: Option<usize>,

    /// Write the default config file and exit
    #[arg(long = "write-config", action)]
    write_config: bool,

    /// Overwrite an existing config file with --write-config
    #[arg(long = "force", action)]
    force: bool,
}

fn load_options(args: &Args, config: &AppConfig) -> LoadOptions {
    let mut opts = LoadOptions::default();
    opts.delimiter = args.delimiter.or(config.file_loading.delimiter);
    opts.has_header = args
        .no_header
        .map(|no_header| !no_header)
        .or(config.file_loading.has_header)
        .unwrap_or(true);
    opts
}

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, path: PathBuf, config: AppConfig) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();

    let mut config = config;
    if let Some(row_limit) = args.row_limit {
        config.chart.row_limit = row_limit;
    }
    let theme = Theme::from_config(&config.theme, &config.theme.color_mode)?;
    let opts = load_options(args, &config);
    let mut app = App::new_with_config(tx.clone(), theme, config);

    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Open(path, opts))?;

    loop {
        if crossterm::event::poll(std::time::Duration::from_millis(25))? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(std::time::Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(color_eyre::eyre::eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.write_config {
        let manager = ConfigManager::new(APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Wrote default config to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error writing config: {}", e);
                std::process::exit(1);
            }
        }
    }
    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    let Some(path) = args.path.clone() else {
        eprintln!("Error: no input file given. See --help.");
        std::process::exit(2);
    };

    color_eyre::install()?;
    let config = AppConfig::load(APP_NAME).unwrap_or_else(|e| {
        eprintln!("Warning: {}. Using default configuration.", e);
        AppConfig::default()
    });

    let terminal = ratatui::init();
    let result = run(terminal, &args, path, config);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            path: None,
            no_header: None,
            delimiter: None,
            row_limit: None,
            write_config: false,
            force: false,
        }
    }

    #[test]
    fn cli_flags_override_config() {
        let mut args = base_args();
        args.no_header = Some(true);
        args.delimiter = Some(b';');
        let opts = load_options(&args, &AppConfig::default());
        assert!(!opts.has_header);
        assert_eq!(opts.delimiter, Some(b';'));
    }

    #[test]
    fn config_fills_unset_flags() {
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some(b'|');
        config.file_loading.has_header = Some(false);
        let opts = load_options(&base_args(), &config);
        assert!(!opts.has_header);
        assert_eq!(opts.delimiter, Some(b'|'));
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let opts = load_options(&base_args(), &AppConfig::default());
        assert!(opts.has_header);
        assert_eq!(opts.delimiter, None);
    }
}
