use clap::{Parser, Subcommand};
use log::debug;
use stackbound::cache::CachedSource;
use stackbound::lineup::{build_issue_lineup, issue_cover_lines};
use stackbound::source::{self, ContentSource, PostQuery};
use stackbound::{config, generate, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "stackbound")]
#[command(about = "Static site generator for magazines")]
#[command(long_about = "\
Static site generator for magazines

Publications publish issues; issues have a declarative cover and a lineup of
posts. Content is read from local files or from the Sanity CMS.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── publications/
  │   └── ops-quarterly.json       # One publication per file
  ├── issues/
  │   └── ops-2024-spring.json     # One issue per file, with its coverSpec
  └── posts/
      ├── pager-fatigue.md         # YAML front matter + Markdown body
      └── field-notes/
          └── night-shift.md       # Slug: field-notes/night-shift

CMS mode is enabled with [cms] in config.toml or the environment:

  SET_SANITY_ENABLED=1 SANITY_PROJECT_ID=abc123 SANITY_DATASET=production
  SANITY_READ_TOKEN=...            # Optional, enables draft previews

Run 'stackbound gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory (also where config.toml is read from)
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log debug diagnostics (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the whole site: pages and feeds
    Build,
    /// Load and normalize all content, print an inventory
    Check,
    /// Print an issue's cover lines and lineup
    Lineup {
        /// Publication id
        publication: String,
        /// Issue slug
        issue: String,
    },
    /// Print a single post's record
    Post {
        /// Post slug, e.g. `field-notes/night-shift`
        slug: String,
        /// Also find drafts (uses the preview client in CMS mode)
        #[arg(long)]
        drafts: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    match cli.command {
        Command::Build => {
            let (site_config, content) = open_content(&cli.source)?;
            init_thread_pool(&site_config.processing);
            println!(
                "==> Building from {} source \u{2192} {}",
                content.name(),
                cli.output.display()
            );
            let summary = generate::generate(&content, &site_config, &cli.output)?;
            output::print_build_summary(&summary);
            println!("Cache: {}", content.stats());
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let (site_config, content) = open_content(&cli.source)?;
            println!("==> Checking {} source", content.name());
            let snapshot = generate::SiteSnapshot::fetch(&content, &site_config)?;
            output::print_check_output(&snapshot);
            println!("==> Content is valid");
        }
        Command::Lineup { publication, issue } => {
            let (site_config, content) = open_content(&cli.source)?;
            if content.publication(&publication)?.is_none() {
                return Err(format!("publication {publication:?} not found").into());
            }
            let issue = content
                .issue(&publication, &issue)?
                .ok_or_else(|| format!("issue {publication}:{issue} not found"))?;
            let posts = content.posts_for_issue(&publication, &issue.issue_slug)?;
            debug!("{} posts in {}", posts.len(), issue.key());
            let lineup = build_issue_lineup(&posts, &issue);
            let cover_lines = issue_cover_lines(&issue, &posts, site_config.listing.cover_lines);
            output::print_lineup_output(&issue, &lineup, &cover_lines);
        }
        Command::Post { slug, drafts } => {
            let (_, content) = open_content(&cli.source)?;
            let query = PostQuery {
                include_draft: drafts,
            };
            let post = content
                .post_by_slug(&slug, query)?
                .ok_or_else(|| format!("post {slug:?} not found"))?;
            output::print_post_output(&post);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config (file, then environment) and open the content source it selects.
fn open_content(
    content_root: &Path,
) -> Result<(config::SiteConfig, CachedSource), Box<dyn std::error::Error>> {
    let site_config = config::load_config(content_root)?;
    let content = CachedSource::new(source::from_config(&site_config, content_root)?);
    Ok((site_config, content))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
