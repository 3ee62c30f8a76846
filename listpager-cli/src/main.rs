use clap::{Parser, Subcommand};
use listpager_core::persistence::file::default_state_dir;
use listpager_core::{
    HttpPageFetcher, JsonFilePageSizeStorage, ListDisplay, PageFetcher, PageSizeStorage,
    PagerError, PagerOptions, PaginationView, Paginator, VecFetcher, ViewAction,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "listpager")]
#[command(about = "Browse paginated lists and manage remembered page sizes")]
struct Cli {
    /// JSON file with widget options (allowedPageSizes, defaultPageSize, slug, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding page_sizes.json (defaults to the platform config dir)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Default)]
struct WidgetArgs {
    /// Remember the chosen page size under this key
    #[arg(long)]
    slug: Option<String>,
    /// Page size to use when none was remembered
    #[arg(long)]
    page_size: Option<u32>,
    /// Page to open first
    #[arg(long, default_value = "1")]
    page: u32,
    /// Number of page links shown around the current page
    #[arg(long)]
    max_pages_shown: Option<u32>,
    /// Only show the page links (no summary or size selector)
    #[arg(long)]
    inline: bool,
    /// Print the first page and exit instead of reading commands from stdin
    #[arg(long)]
    once: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Page through a JSON endpoint (GET <url>?page=N&limit=M)
    Browse {
        url: String,
        #[command(flatten)]
        widget: WidgetArgs,
    },
    /// Page through a generated list of rows
    Demo {
        /// Number of rows to generate
        #[arg(long, default_value = "23")]
        items: u32,
        #[command(flatten)]
        widget: WidgetArgs,
    },
    /// Inspect or edit remembered page sizes
    PageSize {
        #[command(subcommand)]
        action: PageSizeAction,
    },
}

#[derive(Subcommand)]
enum PageSizeAction {
    /// List every remembered page size
    List,
    /// Show the page size remembered for a slug
    Get { slug: String },
    /// Remember a page size for a slug
    Set { slug: String, size: u32 },
    /// Forget the page size for a slug
    Remove { slug: String },
    /// Forget all page sizes
    Clear,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            // Example: RUST_LOG=listpager_core::paginator=debug
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listpager_core=info,listpager_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();
    let state_dir = cli.state_dir.clone().unwrap_or_else(default_state_dir);
    let storage = Arc::new(JsonFilePageSizeStorage::new(&state_dir)?);
    let base_options = match &cli.config {
        Some(path) => PagerOptions::from_json_file(path)?,
        None => PagerOptions::default(),
    };

    match cli.command {
        Commands::Browse { url, widget } => {
            let options = widget_options(base_options, &widget)?;
            let fetcher: HttpPageFetcher<serde_json::Value> = HttpPageFetcher::new(url)?;
            let view = PaginationView::new(options.clone(), ListDisplay, json_item_id);
            let paginator = Paginator::new(options, fetcher, Some(storage))?;
            run_widget(&paginator, &view, &widget, BufReader::new(tokio::io::stdin())).await?;
        }
        Commands::Demo { items, widget } => {
            let options = widget_options(base_options, &widget)?;
            let rows: Vec<String> = (1..=items).map(|i| format!("Row {}", i)).collect();
            let view = PaginationView::new(options.clone(), ListDisplay, |row: &String| {
                row.trim_start_matches("Row ").to_string()
            });
            let paginator = Paginator::new(options, VecFetcher::new(rows), Some(storage))?;
            run_widget(&paginator, &view, &widget, BufReader::new(tokio::io::stdin())).await?;
        }
        Commands::PageSize { action } => manage_page_sizes(storage.as_ref(), action)?,
    }

    Ok(())
}

fn widget_options(mut options: PagerOptions, args: &WidgetArgs) -> Result<PagerOptions, PagerError> {
    if let Some(slug) = &args.slug {
        options.slug = Some(slug.clone());
    }
    if let Some(size) = args.page_size {
        options.default_page_size = size;
    }
    if let Some(shown) = args.max_pages_shown {
        options.max_pages_shown = shown;
    }
    if args.inline {
        options.inline_page_list_only = true;
    }
    options.validate()?;
    Ok(options)
}

fn json_item_id(item: &serde_json::Value) -> String {
    match item.get("id") {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(id) => id.to_string(),
        None => "-".to_string(),
    }
}

async fn run_widget<T, F, R>(
    paginator: &Paginator<T, F>,
    view: &PaginationView<T>,
    args: &WidgetArgs,
    input: R,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: Clone + Send,
    F: PageFetcher<T>,
    R: AsyncBufRead + Unpin,
{
    // The first load learns the total so the requested page can be clamped
    paginator.go_to_page(1).await?;
    if args.page != 1 {
        paginator.go_to_page(args.page).await?;
    }
    println!("{}", view.render(&paginator.snapshot()));

    if args.once {
        paginator.unmount();
        return Ok(());
    }

    println!("Commands: n(ext), p(rev), <page>, g <page>, s <size>, r(efresh), q(uit)");
    let mut lines = input.lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let result = match parse_command(&line) {
            Some(Command::Quit) => break,
            Some(Command::Refresh) => paginator.refresh().await.map(Some),
            Some(Command::Action(action)) => paginator.dispatch(action).await,
            None => {
                eprintln!("Unknown command: {}", line.trim());
                continue;
            }
        };
        if let Err(e) = result {
            // The last good page stays on screen
            eprintln!("{}", e);
        }
        println!("{}", view.render(&paginator.snapshot()));
    }

    paginator.unmount();
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Command {
    Action(ViewAction),
    Refresh,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let arg = parts.next();

    match (head, arg) {
        ("n" | "next", None) => Some(Command::Action(ViewAction::Next)),
        ("p" | "prev", None) => Some(Command::Action(ViewAction::Previous)),
        ("r" | "refresh", None) => Some(Command::Refresh),
        ("q" | "quit", None) => Some(Command::Quit),
        ("g" | "go", Some(page)) => Some(Command::Action(ViewAction::GoToInput(page.to_string()))),
        ("s" | "size", Some(size)) => size
            .parse()
            .ok()
            .map(|size| Command::Action(ViewAction::ChangePageSize(size))),
        (page, None) if page.parse::<i64>().is_ok() => {
            Some(Command::Action(ViewAction::GoToInput(page.to_string())))
        }
        _ => None,
    }
}

fn manage_page_sizes(
    storage: &dyn PageSizeStorage,
    action: PageSizeAction,
) -> Result<(), PagerError> {
    match action {
        PageSizeAction::List => {
            let entries = storage.entries()?;
            if entries.is_empty() {
                println!("No remembered page sizes");
            }
            for (slug, entry) in entries {
                println!("{}\t{}\t{}", slug, entry.page_size, entry.stored_at);
            }
        }
        PageSizeAction::Get { slug } => {
            let entries = storage.entries()?;
            match entries.iter().find(|(s, _)| *s == slug) {
                Some((_, entry)) => println!("{}", entry.page_size),
                None => println!("No page size remembered for '{}'", slug),
            }
        }
        PageSizeAction::Set { slug, size } => {
            if size == 0 {
                return Err(PagerError::InvalidPageSize(size));
            }
            storage.set(Some(&slug), size)?;
            println!("Remembered page size {} for '{}'", size, slug);
        }
        PageSizeAction::Remove { slug } => {
            storage.remove(&slug)?;
            log::debug!("Removed page size for '{}'", slug);
        }
        PageSizeAction::Clear => {
            storage.clear()?;
            println!("Cleared all remembered page sizes");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation_commands() {
        assert_eq!(parse_command("n\n"), Some(Command::Action(ViewAction::Next)));
        assert_eq!(parse_command(" prev "), Some(Command::Action(ViewAction::Previous)));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("r"), Some(Command::Refresh));
    }

    #[test]
    fn test_parse_page_and_size_commands() {
        assert_eq!(
            parse_command("7"),
            Some(Command::Action(ViewAction::GoToInput("7".to_string())))
        );
        assert_eq!(
            parse_command("g 3"),
            Some(Command::Action(ViewAction::GoToInput("3".to_string())))
        );
        assert_eq!(
            parse_command("s 50"),
            Some(Command::Action(ViewAction::ChangePageSize(50)))
        );
        assert_eq!(parse_command("s fifty"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("jump"), None);
    }

    #[test]
    fn test_widget_options_overrides() {
        let args = WidgetArgs {
            slug: Some("cases".to_string()),
            page_size: Some(50),
            inline: true,
            ..Default::default()
        };
        let options = widget_options(PagerOptions::default(), &args).unwrap();
        assert_eq!(options.slug.as_deref(), Some("cases"));
        assert_eq!(options.default_page_size, 50);
        assert!(options.inline_page_list_only);

        let bad = WidgetArgs {
            page_size: Some(7),
            ..Default::default()
        };
        assert!(widget_options(PagerOptions::default(), &bad).is_err());
    }

    #[tokio::test]
    async fn test_widget_reads_commands_until_quit() {
        let options = PagerOptions::default().with_default_page_size(5);
        let rows: Vec<String> = (1..=23).map(|i| format!("Row {}", i)).collect();
        let view = PaginationView::new(options.clone(), ListDisplay, |row: &String| row.clone());
        let paginator = Paginator::new(options, VecFetcher::new(rows), None).unwrap();
        let args = WidgetArgs {
            page: 2,
            ..Default::default()
        };

        let input: &[u8] = b"n\nbogus\ns 25\n4\nq\nn\n";
        run_widget(&paginator, &view, &args, input).await.unwrap();

        // "4" clamps to the only page at size 25; the trailing "n" is never read
        assert_eq!(paginator.page_size(), 25);
        assert_eq!(paginator.current_page(), 1);
        assert!(paginator.is_unmounted());
    }

    #[tokio::test]
    async fn test_widget_stops_at_end_of_input() {
        let options = PagerOptions::default().with_default_page_size(5);
        let view = PaginationView::new(options.clone(), ListDisplay, |n: &u32| n.to_string());
        let paginator = Paginator::new(options, VecFetcher::new((1..=23).collect::<Vec<u32>>()), None).unwrap();
        let args = WidgetArgs {
            page: 1,
            ..Default::default()
        };

        let input: &[u8] = b"n\nn\n";
        run_widget(&paginator, &view, &args, input).await.unwrap();
        assert_eq!(paginator.current_page(), 3);
        assert!(paginator.is_unmounted());
    }

    #[test]
    fn test_json_item_id() {
        assert_eq!(json_item_id(&serde_json::json!({"id": "abc"})), "abc");
        assert_eq!(json_item_id(&serde_json::json!({"id": 12})), "12");
        assert_eq!(json_item_id(&serde_json::json!({"name": "x"})), "-");
    }
}
