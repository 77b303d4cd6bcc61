use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// A dependently typed language in the tradition of The Little Typer
#[derive(Parser)]
#[clap(author, version, about)]
enum Cli {
    /// Elaborate a Pie module or term, printing the result to stdout
    Elab {
        /// Path to a module to elaborate
        #[clap(
            long = "module",
            name = "MODULE_FILE",
            group = "input",
            required_unless_present = "input",
            display_order = 0
        )]
        module_file: Option<PathOrStdin>,
        /// Path to a term to elaborate
        #[clap(
            long = "term",
            name = "TERM_FILE",
            group = "input",
            required_unless_present = "input",
            display_order = 1
        )]
        term_file: Option<PathOrStdin>,
        /// Continue even if errors were encountered
        #[clap(long = "allow-errors")]
        allow_errors: bool,
        /// Print the context after elaborating a module
        #[clap(long = "print-context")]
        print_context: bool,
        /// Report the type of every expression in the source
        #[clap(long = "info")]
        info: bool,
    },
    /// Normalise a Pie term, printing its normal form and type
    Norm {
        /// Path to a term to normalise
        #[clap(long = "term", name = "TERM_FILE", display_order = 0)]
        term_file: PathOrStdin,
        /// Continue even if errors were encountered
        #[clap(long = "allow-errors")]
        allow_errors: bool,
    },
}

#[derive(Clone, Debug)]
enum PathOrStdin {
    StdIn,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(src: &str) -> Result<PathOrStdin, std::convert::Infallible> {
        match src {
            "-" => Ok(PathOrStdin::StdIn),
            _ => Ok(PathOrStdin::Path(PathBuf::from(src))),
        }
    }
}

fn unwrap_or_exit<T>(option: Option<T>) -> T {
    option.unwrap_or_else(|| std::process::exit(pie::Status::Error.exit_code()))
}

fn load_file_or_exit(driver: &mut pie::Driver, file: PathOrStdin) -> pie::source::FileId {
    unwrap_or_exit(match file {
        PathOrStdin::StdIn => driver.load_source("<stdin>".to_owned(), std::io::stdin()),
        PathOrStdin::Path(path) => driver.load_source_path(&path),
    })
}

const MAX_PRETTY_WIDTH: usize = 80;

fn get_pretty_width() -> usize {
    let term_width = termsize::get().map_or(usize::MAX, |size| usize::from(size.cols));
    std::cmp::min(term_width, MAX_PRETTY_WIDTH)
}

/// Log to stderr, filtered by `PIE_LOG`. Nothing is logged by default.
fn init_logging() {
    let filter = EnvFilter::try_from_env("PIE_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ! {
    init_logging();

    match Cli::parse() {
        Cli::Elab {
            module_file,
            term_file,
            allow_errors,
            print_context,
            info,
        } => {
            let mut driver = pie::Driver::new();
            driver.install_panic_hook();
            driver.set_allow_errors(allow_errors);
            driver.set_print_context(print_context);
            driver.set_show_info(info);
            driver.set_emit_width(get_pretty_width());

            let status = match (module_file, term_file) {
                (Some(module_file), None) => {
                    let file_id = load_file_or_exit(&mut driver, module_file);
                    driver.elaborate_and_emit_module(file_id)
                }
                (None, Some(term_file)) => {
                    let file_id = load_file_or_exit(&mut driver, term_file);
                    driver.elaborate_and_emit_term(file_id)
                }
                (Some(_), Some(_)) | (None, None) => {
                    unreachable!(r#"guarded by `required_unless_present = "input"`"#)
                }
            };

            std::process::exit(status.exit_code());
        }
        Cli::Norm {
            term_file,
            allow_errors,
        } => {
            let mut driver = pie::Driver::new();
            driver.install_panic_hook();
            driver.set_allow_errors(allow_errors);
            driver.set_emit_width(get_pretty_width());

            let file_id = load_file_or_exit(&mut driver, term_file);
            let status = driver.normalise_and_emit_term(file_id);

            std::process::exit(status.exit_code());
        }
    }
}
