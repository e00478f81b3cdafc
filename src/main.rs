use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use recipe_harvest::config::load_config;
use recipe_harvest::output::{
    load_recipes, load_urls, read_url_list, save_recipes, save_urls, timestamped_filename,
    FileCheckpoint,
};
use recipe_harvest::pipeline::transfer;
use recipe_harvest::{
    ArchiveCrawler, HarvestConfig, HarvestPipeline, HarvestReport, PageExtractor, Recipe,
    RequestFetcher, SqliteStore,
};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Harvest recipes from essen-und-trinken.de into JSON files and SQLite
#[derive(Parser, Debug)]
#[command(name = "recipe-harvest", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (default: ./harvest.toml if present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect recipe URLs from the archive without fetching recipes
    Urls {
        /// Stop after this many archive pages
        #[arg(long)]
        pages: Option<usize>,
    },
    /// Harvest a handful of recipes as a test
    Test {
        #[arg(default_value_t = 5)]
        count: usize,
        #[command(flatten)]
        args: HarvestArgs,
    },
    /// Harvest the first N recipes of the archive
    Harvest {
        #[arg(default_value_t = 50)]
        count: usize,
        #[command(flatten)]
        args: HarvestArgs,
    },
    /// Harvest every recipe of the archive (takes hours)
    All {
        #[command(flatten)]
        args: HarvestArgs,
    },
    /// Harvest the URLs listed in a text file straight into the database
    Transfer {
        /// One URL per line, '#' starts a comment
        url_file: PathBuf,
    },
    /// Store recipes from a JSON file in the database
    Import {
        json_file: PathBuf,
    },
    /// Interactive menu (default)
    Menu,
}

#[derive(Args, Debug, Default)]
struct HarvestArgs {
    /// Read recipe URLs from this JSON file instead of crawling the archive
    #[arg(long, value_name = "FILE")]
    urls: Option<PathBuf>,

    /// Also store the harvested recipes in the database
    #[arg(long)]
    store: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let app = App::new(config)?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Urls { pages } => app.fetch_urls(pages)?,
        Command::Test { count, args } => app.harvest("test_recipes", Some(count), &args)?,
        Command::Harvest { count, args } => {
            app.harvest(&format!("recipes_{count}"), Some(count), &args)?
        }
        Command::All { args } => app.harvest("all_recipes", None, &args)?,
        Command::Transfer { url_file } => app.transfer_url_file(&url_file)?,
        Command::Import { json_file } => app.import_json(&json_file)?,
        Command::Menu => run_menu(&app)?,
    }

    Ok(())
}

struct App {
    config: HarvestConfig,
    fetcher: RequestFetcher,
}

impl App {
    fn new(config: HarvestConfig) -> Result<Self, Box<dyn Error>> {
        let fetcher = RequestFetcher::new(Some(config.timeout()))?;
        Ok(Self { config, fetcher })
    }

    fn output_path(&self, filename: &str) -> PathBuf {
        self.config.output.dir.join(filename)
    }

    fn collect_urls(&self, page_limit: Option<usize>) -> Vec<String> {
        let crawler = ArchiveCrawler::new(
            &self.fetcher,
            self.config.site.clone(),
            &self.config.crawler,
        );
        crawler.crawl(&self.config.site.archive_url(), page_limit)
    }

    fn run_pipeline(&self, urls: &[String], max_count: Option<usize>) -> HarvestReport {
        let extractor = PageExtractor::new(self.config.site.clone(), &self.fetcher);
        let checkpoint = FileCheckpoint::new(&self.config.output.dir);
        let mut pipeline = HarvestPipeline::new(extractor, checkpoint, &self.config.harvest);
        pipeline.harvest(urls, max_count)
    }

    fn store(&self, recipes: &[Recipe]) -> Result<(), Box<dyn Error>> {
        let store = SqliteStore::new(&self.config.output.database_path)?;
        let report = transfer(recipes, &store);
        println!(
            "Stored {} recipes in {} ({} failed)",
            report.stored.len(),
            self.config.output.database_path.display(),
            report.failed.len()
        );
        Ok(())
    }

    fn fetch_urls(&self, page_limit: Option<usize>) -> Result<(), Box<dyn Error>> {
        let urls = self.collect_urls(page_limit);
        if urls.is_empty() {
            println!("No URLs found!");
            return Ok(());
        }

        let path = self.output_path(&timestamped_filename("recipe_urls"));
        save_urls(&path, &urls)?;
        println!("Success! Found {} recipe URLs", urls.len());
        println!("Saved to: {}", path.display());
        Ok(())
    }

    fn harvest(
        &self,
        stem: &str,
        max_count: Option<usize>,
        args: &HarvestArgs,
    ) -> Result<(), Box<dyn Error>> {
        let urls = match &args.urls {
            Some(path) => load_urls(path)?,
            None => {
                info!("Step 1: Getting all recipe URLs...");
                let urls = self.collect_urls(None);
                if !urls.is_empty() {
                    save_urls(&self.output_path("recipe_urls.json"), &urls)?;
                }
                urls
            }
        };
        if urls.is_empty() {
            println!("No URLs found!");
            return Ok(());
        }

        info!("Step 2: Extracting recipe details...");
        let report = self.run_pipeline(&urls, max_count);
        if report.successes.is_empty() {
            println!("No recipes processed!");
            return Ok(());
        }

        let path = self.output_path(&timestamped_filename(stem));
        save_recipes(&path, &report.successes)?;
        println!(
            "Success! Processed {} recipes, {} failed",
            report.successes.len(),
            report.failures.len()
        );
        println!("Saved to: {}", path.display());

        if args.store {
            self.store(&report.successes)?;
        }
        Ok(())
    }

    fn transfer_url_file(&self, url_file: &Path) -> Result<(), Box<dyn Error>> {
        let urls = read_url_list(url_file, &self.config.site)?;
        if urls.is_empty() {
            println!("No URLs in {}", url_file.display());
            return Ok(());
        }

        let report = self.run_pipeline(&urls, None);
        println!(
            "Processed {} recipes, {} failed",
            report.successes.len(),
            report.failures.len()
        );
        self.store(&report.successes)
    }

    fn import_json(&self, json_file: &Path) -> Result<(), Box<dyn Error>> {
        let recipes = load_recipes(json_file)?;
        info!("Loaded {} recipes from {}", recipes.len(), json_file.display());
        self.store(&recipes)
    }
}

fn run_menu(app: &App) -> Result<(), Box<dyn Error>> {
    println!("Essen & Trinken Recipe Harvester");
    println!("{}", "=".repeat(40));
    println!();

    loop {
        println!("What would you like to do?");
        println!("1. Get all recipe URLs only");
        println!("2. Test with 5 recipes");
        println!("3. Harvest 50 recipes");
        println!("4. Harvest ALL recipes (this will take a long time!)");
        println!("5. Exit");
        println!();

        let Some(choice) = prompt("Enter your choice (1-5): ")? else {
            break;
        };

        let result = match choice.as_str() {
            "1" => app.fetch_urls(None),
            "2" => app.harvest("test_recipes", Some(5), &HarvestArgs::default()),
            "3" => app.harvest("recipes_50", Some(50), &HarvestArgs::default()),
            "4" => {
                println!("\nWARNING: This will harvest ALL recipes and may take several hours!");
                match prompt("Are you sure? (yes/no): ")? {
                    Some(answer) if answer.eq_ignore_ascii_case("yes") => {
                        app.harvest("all_recipes", None, &HarvestArgs::default())
                    }
                    _ => {
                        println!("Cancelled.");
                        Ok(())
                    }
                }
            }
            "5" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                warn!("Invalid choice: {}", choice);
                println!("Invalid choice. Please enter 1-5.");
                Ok(())
            }
        };

        if let Err(e) = result {
            error!("{}", e);
            println!("Error: {e}");
        }

        println!("\n{}\n", "-".repeat(40));
    }

    Ok(())
}

/// Read one trimmed line from stdin; `None` on end of input.
fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
